//! Dependency declarations for a project.
//!
//! Each project root may contain an `sn.reky` file in a
//! `requirements.txt`-like format:
//!
//! ```text
//! # comments and blank lines are ignored
//! http==1.2.0
//! json==0.4.1
//! ```
//!
//! The first `==` on a line splits name from version; both must be
//! non-empty. A whole file is scanned before any error is returned, so a
//! single run reports every malformed line.

use std::collections::BTreeMap;

// ─── Data Types ────────────────────────────────────────────────────

/// Fixed name of the declaration file inside a project root.
pub const DECLARATION_FILE: &str = "sn.reky";

/// Token separating name from version.
pub const SEPARATOR: &str = "==";

/// A package some project requires. The download URL is only known once
/// the package has been looked up in the index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequiredPackage {
    pub name: String,
    pub version: String,
    pub download_url: Option<String>,
}

impl RequiredPackage {
    pub fn new(name: &str, version: &str) -> Self {
        Self {
            name: name.to_string(),
            version: version.to_string(),
            download_url: None,
        }
    }
}

/// Parsed declarations of one project: name → exact version.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Declarations {
    pub packages: BTreeMap<String, String>,
}

impl Declarations {
    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.packages.get(name).map(String::as_str)
    }

    /// Declared packages in name order.
    pub fn iter(&self) -> impl Iterator<Item = RequiredPackage> + '_ {
        self.packages
            .iter()
            .map(|(name, version)| RequiredPackage::new(name, version))
    }
}

mod parse;

pub use parse::{load_declarations, parse_declarations, parse_line, ParsedLine};
