use std::io::{BufWriter, Write};
use std::path::PathBuf;
use std::process;

use clap::Args;
use reky::{fetch_dependencies, Session};

use super::{absolute, fail, project_dir, WorkspaceArgs};

#[derive(Args)]
pub struct FetchArgs {
    /// Project roots to resolve (default: current directory)
    pub roots: Vec<PathBuf>,
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
    /// Ignore the cached resolution and resolve from scratch
    #[arg(long)]
    pub fresh: bool,
    /// Write the dependency graph in Graphviz DOT format
    #[arg(long, value_name = "PATH")]
    pub graph: Option<PathBuf>,
}

pub fn cmd_fetch(args: FetchArgs) {
    let roots: Vec<PathBuf> = if args.roots.is_empty() {
        vec![project_dir(None)]
    } else {
        args.roots.iter().map(|r| project_dir(Some(r))).collect()
    };

    let mut settings = args.workspace.settings(&roots[0]);
    settings.fresh = args.fresh;
    let mut session = Session::with_git(settings);

    let resolution = match fetch_dependencies(&mut session, &roots) {
        Ok(r) => r,
        Err(e) => fail(&e),
    };

    if let Some(graph_path) = args.graph {
        let graph_path = absolute(&graph_path);
        let written = std::fs::File::create(&graph_path).and_then(|file| {
            let mut out = BufWriter::new(file);
            resolution.graph.write_dot(&mut out)?;
            out.flush()
        });
        if let Err(e) = written {
            eprintln!("error: cannot write '{}': {}", graph_path.display(), e);
            process::exit(1);
        }
        eprintln!("Wrote {}", graph_path.display());
    }

    let stats = resolution.stats;
    eprintln!(
        "Resolved {} packages ({} installed, {} passes). Cache written to {}.",
        resolution.cache.len(),
        stats.installed,
        stats.passes,
        session.settings().cache_path().display()
    );
}
