use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

use crate::diagnostic::{render_diagnostics, Diagnostic};
use crate::span::Span;

/// One malformed line in a declaration or cache file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FormatIssue {
    /// 1-based line number.
    pub line: usize,
    /// Byte range of the offending line (trimmed) inside the file.
    pub span: Span,
    pub kind: FormatIssueKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatIssueKind {
    MissingSeparator,
    EmptyName,
    EmptyVersion,
    /// Same package declared twice in one file with different versions.
    Conflicting {
        name: String,
        first: String,
        second: String,
    },
}

impl FormatIssue {
    pub fn message(&self) -> String {
        match &self.kind {
            FormatIssueKind::MissingSeparator => {
                "invalid package format, must be 'name==version'".to_string()
            }
            FormatIssueKind::EmptyName => "invalid name format, must be 'name==version'".to_string(),
            FormatIssueKind::EmptyVersion => {
                "invalid version format, must be 'name==version'".to_string()
            }
            FormatIssueKind::Conflicting {
                name,
                first,
                second,
            } => format!(
                "package '{}' is declared with versions '{}' and '{}'",
                name, first, second
            ),
        }
    }
}

/// Error taxonomy of a resolution run, flattened to the cases callers match on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    Format,
    Conflict,
    NotFound,
    Subprocess,
    Io,
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{} malformed line(s) in '{}'", .issues.len(), .path.display())]
    Format {
        path: PathBuf,
        text: String,
        issues: Vec<FormatIssue>,
    },

    #[error("package '{name}' has conflicting versions '{cached}' and '{requested}'")]
    Conflict {
        name: String,
        cached: String,
        requested: String,
        /// Node whose declaration introduced `requested`.
        requirer: String,
    },

    #[error("package '{name}' not found in the package index")]
    PackageNotFound { name: String },

    #[error("version '{version}' not found for package '{name}'")]
    VersionNotFound {
        name: String,
        version: String,
        published: Vec<String>,
    },

    #[error("`{command}` exited with {status}")]
    Subprocess { command: String, status: ExitStatus },

    #[error("cannot run git '{}': {source}", .program.display())]
    GitUnavailable {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot access '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed package descriptor '{}': {source}", .path.display())]
    Descriptor {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ResolveError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Format { .. } => ErrorKind::Format,
            Self::Conflict { .. } => ErrorKind::Conflict,
            Self::PackageNotFound { .. } | Self::VersionNotFound { .. } => ErrorKind::NotFound,
            Self::Subprocess { .. } | Self::GitUnavailable { .. } => ErrorKind::Subprocess,
            Self::Io { .. } | Self::Descriptor { .. } => ErrorKind::Io,
        }
    }

    /// Convert into renderable diagnostics.
    ///
    /// Format errors produce one located diagnostic per malformed line;
    /// every other error is a single diagnostic at the synthetic location.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            Self::Format { path, issues, .. } => {
                let file = path.display().to_string();
                issues
                    .iter()
                    .map(|issue| {
                        Diagnostic::error(issue.message()).at(
                            file.clone(),
                            issue.span,
                            format!("line {}", issue.line),
                        )
                    })
                    .collect()
            }
            Self::Conflict {
                name,
                cached,
                requested,
                requirer,
            } => vec![Diagnostic::error(self.to_string())
                .with_note(format!(
                    "'{}' requires {}=={}, but {}=={} is already resolved",
                    requirer, name, requested, name, cached
                ))
                .with_help(
                    "align the declarations, or re-run with --fresh if the cached resolution is stale"
                        .to_string(),
                )],
            Self::VersionNotFound { published, .. } => {
                let mut d = Diagnostic::error(self.to_string());
                if !published.is_empty() {
                    d = d.with_note(format!("published versions: {}", published.join(", ")));
                }
                vec![d]
            }
            Self::GitUnavailable { .. } => vec![Diagnostic::error(self.to_string())
                .with_help("install git or point --git / REKY_GIT at it".to_string())],
            _ => vec![Diagnostic::error(self.to_string())],
        }
    }

    /// Render every diagnostic of this error to stderr.
    pub fn report(&self) {
        let text = match self {
            Self::Format { text, .. } => text.as_str(),
            _ => "",
        };
        render_diagnostics(&self.diagnostics(), text);
    }
}
