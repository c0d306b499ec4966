//! Resolved dependency set of a workspace.
//!
//! The cache maps every package name seen during resolution to the one
//! version the run settled on. It lives in memory for the duration of a run
//! and is written to disk only after a fixpoint is reached.
//!
//! On-disk format (`.reky_cache`), names padded to the longest one:
//! ```text
//! http  ==  1.2.0
//! json  ==  0.4.1
//! yaml  ==  2.0.0
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::manifest::parse_declarations;
use crate::package::error::ResolveError;

/// Fixed name of the cache file inside the state directory.
pub const CACHE_FILE: &str = ".reky_cache";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DependencyCache {
    entries: BTreeMap<String, String>,
    dirty: bool,
}

impl DependencyCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    /// Record `name` at `version` and mark the cache dirty.
    pub fn add(&mut self, name: &str, version: &str) {
        self.entries.insert(name.to_string(), version.to_string());
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn reset_dirty(&mut self) {
        self.dirty = false;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(name, version)| (name.as_str(), version.as_str()))
    }

    /// Render the aligned text table.
    pub fn to_table(&self) -> String {
        let width = self.entries.keys().map(String::len).max().unwrap_or(0);
        let mut out = String::new();
        for (name, version) in &self.entries {
            out.push_str(&format!("{:<width$}  ==  {}\n", name, version, width = width));
        }
        out
    }

    /// Parse a cache table. The result is clean.
    pub fn from_table(text: &str, path: &Path) -> Result<Self, ResolveError> {
        let decls = parse_declarations(text, path)?;
        Ok(Self {
            entries: decls.packages,
            dirty: false,
        })
    }

    /// Load the cache file at `path`; a missing file is an empty cache.
    pub fn load(path: &Path) -> Result<Self, ResolveError> {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::from_table(&text, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::new()),
            Err(e) => Err(ResolveError::io(path, e)),
        }
    }

    /// Rewrite the cache file at `path` in full.
    pub fn persist(&self, path: &Path) -> Result<(), ResolveError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ResolveError::io(parent, e))?;
        }
        std::fs::write(path, self.to_table()).map_err(|e| ResolveError::io(path, e))
    }
}
