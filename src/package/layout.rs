//! Install directory layout.
//!
//! Every package is cloned into `<deps_dir>/<hex>` where `<hex>` is the
//! BLAKE3 digest of its name. The digest is one-way, so the layout keeps an
//! in-memory name ↔ directory index for the run and persists it as one
//! artifact:
//!
//! ```text
//! <deps_dir>/
//! ├── .reky_names          # "<hex> <name>" per line
//! ├── <hex>/               # clone of the package
//! └── <hex>.name           # sidecar holding the raw package name
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::error::ResolveError;

/// File name of the persisted name index inside the deps directory.
pub const NAMES_FILE: &str = ".reky_names";

/// Extension of the per-package sidecar name record.
pub const SIDECAR_EXT: &str = "name";

/// Directory name for a package: lowercase hex BLAKE3 of the name.
pub fn install_dir_name(name: &str) -> String {
    blake3::hash(name.as_bytes()).to_hex().to_string()
}

/// Check whether a string looks like a 64-char hex digest.
pub(crate) fn is_hex_digest(s: &str) -> bool {
    s.len() == 64 && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[derive(Clone, Debug)]
pub struct InstallLayout {
    deps_dir: PathBuf,
    /// Directory name → package name.
    by_dir: BTreeMap<String, String>,
    /// Package name → directory name.
    by_name: BTreeMap<String, String>,
}

impl InstallLayout {
    /// Empty layout rooted at `deps_dir`. Nothing is read from disk.
    pub fn new(deps_dir: &Path) -> Self {
        Self {
            deps_dir: deps_dir.to_path_buf(),
            by_dir: BTreeMap::new(),
            by_name: BTreeMap::new(),
        }
    }

    /// Build the name index from the persisted artifact and any sidecar
    /// files left in `deps_dir`. A missing directory yields an empty layout.
    pub fn load(deps_dir: &Path) -> Result<Self, ResolveError> {
        let mut layout = Self::new(deps_dir);

        let names_path = deps_dir.join(NAMES_FILE);
        match std::fs::read_to_string(&names_path) {
            Ok(content) => {
                for line in content.lines() {
                    if let Some((dir, name)) = line.trim().split_once(' ') {
                        layout.insert(dir.trim(), name.trim());
                    }
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(ResolveError::io(names_path, e)),
        }

        let entries = match std::fs::read_dir(deps_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(layout),
            Err(e) => return Err(ResolveError::io(deps_dir, e)),
        };
        for entry in entries {
            let path = entry.map_err(|e| ResolveError::io(deps_dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SIDECAR_EXT) {
                continue;
            }
            let stem = match path.file_stem().and_then(|s| s.to_str()) {
                Some(s) if is_hex_digest(s) => s.to_string(),
                _ => continue,
            };
            if layout.by_dir.contains_key(&stem) {
                continue;
            }
            let name = std::fs::read_to_string(&path).map_err(|e| ResolveError::io(&path, e))?;
            layout.insert(&stem, name.trim());
        }

        Ok(layout)
    }

    fn insert(&mut self, dir: &str, name: &str) {
        if dir.is_empty() || name.is_empty() {
            return;
        }
        self.by_dir.insert(dir.to_string(), name.to_string());
        self.by_name.insert(name.to_string(), dir.to_string());
    }

    pub fn deps_dir(&self) -> &Path {
        &self.deps_dir
    }

    /// Record `name` in the index and return its install directory.
    pub fn register(&mut self, name: &str) -> PathBuf {
        let dir = install_dir_name(name);
        self.insert(&dir, name);
        self.deps_dir.join(dir)
    }

    pub fn install_dir(&self, name: &str) -> PathBuf {
        match self.by_name.get(name) {
            Some(dir) => self.deps_dir.join(dir),
            None => self.deps_dir.join(install_dir_name(name)),
        }
    }

    pub fn sidecar_path(&self, name: &str) -> PathBuf {
        self.install_dir(name).with_extension(SIDECAR_EXT)
    }

    /// A package counts as installed once its directory exists.
    pub fn is_installed(&self, name: &str) -> bool {
        self.install_dir(name).is_dir()
    }

    /// Package name owning an install directory name, if known.
    pub fn name_for_dir(&self, dir_name: &str) -> Option<&str> {
        self.by_dir.get(dir_name).map(String::as_str)
    }

    /// Package name owning `path`, when `path` is an install directory
    /// directly under `deps_dir`.
    pub fn name_for_path(&self, path: &Path) -> Option<&str> {
        if path.parent() != Some(self.deps_dir.as_path()) {
            return None;
        }
        let dir_name = path.file_name()?.to_str()?;
        self.name_for_dir(dir_name)
    }

    /// Write the sidecar name record for a freshly installed package.
    pub fn write_sidecar(&self, name: &str) -> Result<(), ResolveError> {
        let path = self.sidecar_path(name);
        std::fs::write(&path, name).map_err(|e| ResolveError::io(path, e))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Persist the whole index as `<deps_dir>/.reky_names`.
    pub fn persist(&self) -> Result<(), ResolveError> {
        std::fs::create_dir_all(&self.deps_dir)
            .map_err(|e| ResolveError::io(&self.deps_dir, e))?;
        let mut out = String::new();
        for (dir, name) in &self.by_dir {
            out.push_str(dir);
            out.push(' ');
            out.push_str(name);
            out.push('\n');
        }
        let path = self.deps_dir.join(NAMES_FILE);
        std::fs::write(&path, out).map_err(|e| ResolveError::io(path, e))
    }
}
