use std::collections::BTreeMap;
use std::path::Path;

use super::{Declarations, DECLARATION_FILE, SEPARATOR};
use crate::package::error::{FormatIssue, FormatIssueKind, ResolveError};
use crate::span::Span;

// ─── Parsing ───────────────────────────────────────────────────────

/// Outcome of parsing a single (already trimmed) line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedLine<'a> {
    Skip,
    Entry { name: &'a str, version: &'a str },
    Malformed(FormatIssueKind),
}

/// Parse one line of the `name==version` grammar.
pub fn parse_line(line: &str) -> ParsedLine<'_> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return ParsedLine::Skip;
    }
    let Some((name, version)) = trimmed.split_once(SEPARATOR) else {
        return ParsedLine::Malformed(FormatIssueKind::MissingSeparator);
    };
    let (name, version) = (name.trim(), version.trim());
    if name.is_empty() {
        return ParsedLine::Malformed(FormatIssueKind::EmptyName);
    }
    if version.is_empty() {
        return ParsedLine::Malformed(FormatIssueKind::EmptyVersion);
    }
    ParsedLine::Entry { name, version }
}

/// Parse the full text of a declaration (or cache) file.
///
/// `path` is only used to label errors. Every line is examined; if any is
/// malformed the result carries all of them in line order.
pub fn parse_declarations(source: &str, path: &Path) -> Result<Declarations, ResolveError> {
    let mut packages: BTreeMap<String, String> = BTreeMap::new();
    let mut issues = Vec::new();
    let mut offset = 0usize;

    for (idx, raw) in source.split_inclusive('\n').enumerate() {
        let line_start = offset;
        offset += raw.len();

        let content = raw.trim_end_matches(['\n', '\r']);
        let lead = content.len() - content.trim_start().len();
        let span = Span::at(line_start + lead, content.trim().len());

        match parse_line(content) {
            ParsedLine::Skip => {}
            ParsedLine::Malformed(kind) => issues.push(FormatIssue {
                line: idx + 1,
                span,
                kind,
            }),
            ParsedLine::Entry { name, version } => match packages.get(name) {
                Some(first) if first != version => issues.push(FormatIssue {
                    line: idx + 1,
                    span,
                    kind: FormatIssueKind::Conflicting {
                        name: name.to_string(),
                        first: first.clone(),
                        second: version.to_string(),
                    },
                }),
                Some(_) => {}
                None => {
                    packages.insert(name.to_string(), version.to_string());
                }
            },
        }
    }

    if issues.is_empty() {
        Ok(Declarations { packages })
    } else {
        Err(ResolveError::Format {
            path: path.to_path_buf(),
            text: source.to_string(),
            issues,
        })
    }
}

/// Read `<root>/sn.reky`. A project without the file declares nothing.
pub fn load_declarations(root: &Path) -> Result<Declarations, ResolveError> {
    let path = root.join(DECLARATION_FILE);
    match std::fs::read_to_string(&path) {
        Ok(source) => parse_declarations(&source, &path),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Declarations::default()),
        Err(e) => Err(ResolveError::io(path, e)),
    }
}
