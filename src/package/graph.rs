use std::collections::BTreeMap;
use std::io::Write;

/// Label written into every exported graph.
pub const GRAPH_LABEL: &str = "Reky Dependencies";

/// Who requires whom: node → direct dependency names, in declaration order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyGraph {
    nodes: BTreeMap<String, Vec<String>>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the outgoing edges of `node`.
    pub fn set_edges(&mut self, node: &str, deps: Vec<String>) {
        self.nodes.insert(node.to_string(), deps);
    }

    pub fn edges(&self, node: &str) -> Option<&[String]> {
        self.nodes.get(node).map(Vec::as_slice)
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(Vec::len).sum()
    }

    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.edges(from)
            .is_some_and(|deps| deps.iter().any(|d| d == to))
    }

    /// Write the graph in Graphviz DOT format.
    pub fn write_dot<W: Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "digraph G {{")?;
        writeln!(out, "  label = \"{}\";", GRAPH_LABEL)?;
        for (node, deps) in &self.nodes {
            for dep in deps {
                writeln!(
                    out,
                    "  \"{}\" -> \"{}\" [arrowhead = diamond];",
                    escape(node),
                    escape(dep)
                )?;
            }
        }
        writeln!(out, "}}")
    }

    pub fn to_dot(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_dot(&mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

/// Escape a node name for use inside a quoted DOT identifier.
fn escape(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}
