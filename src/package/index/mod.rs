//! Git-hosted package index.
//!
//! The index is a plain repository cloned under the fetcher home:
//!
//! ```text
//! <index_dir>/
//! └── pkgs/
//!     ├── http.json     # {"versions": ["1.0.0", "1.2.0"], "download_url": "..."}
//!     └── json.json
//! ```
//!
//! The clone is refreshed at most once per run: cloned on first use,
//! pulled afterwards.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use super::error::ResolveError;
use super::git::{CloneRequest, Vcs};
use crate::manifest::RequiredPackage;

/// Well-known index repository.
pub const DEFAULT_INDEX_URL: &str = "https://github.com/snowball-lang/packages.git";

/// Directory inside the index holding one descriptor per package.
const PKGS_DIR: &str = "pkgs";

/// Descriptor of one package as published in the index.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct IndexEntry {
    pub versions: Vec<String>,
    pub download_url: String,
}

impl IndexEntry {
    pub fn has_version(&self, version: &str) -> bool {
        self.versions.iter().any(|v| v == version)
    }
}

/// Whether `ensure_fresh` had to clone or could pull.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Refresh {
    Cloned,
    Pulled,
    /// Already refreshed earlier in this run.
    Skipped,
}

#[derive(Clone, Debug)]
pub struct PackageIndex {
    url: String,
    dir: PathBuf,
    refreshed: bool,
}

impl PackageIndex {
    pub fn new(url: &str, dir: &Path) -> Self {
        Self {
            url: url.to_string(),
            dir: dir.to_path_buf(),
            refreshed: false,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn is_refreshed(&self) -> bool {
        self.refreshed
    }

    /// Clone the index if it is missing, pull it otherwise. Does nothing
    /// after the first call.
    ///
    /// A failed pull leaves the existing clone usable, so it only warns.
    pub fn ensure_fresh(&mut self, vcs: &dyn Vcs) -> Result<Refresh, ResolveError> {
        if self.refreshed {
            return Ok(Refresh::Skipped);
        }
        self.refreshed = true;

        if !self.dir.exists() {
            tracing::info!(url = %self.url, "Fetching package index");
            if let Some(parent) = self.dir.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ResolveError::io(parent, e))?;
            }
            vcs.clone_repo(&CloneRequest::full(&self.url, &self.dir))?;
            return Ok(Refresh::Cloned);
        }

        tracing::info!(dir = %self.dir.display(), "Updating package index");
        if let Err(e) = vcs.pull(&self.dir) {
            tracing::warn!(error = %e, "could not update package index, using local copy");
        }
        Ok(Refresh::Pulled)
    }

    fn descriptor_path(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty()
            || name.starts_with('.')
            || name.contains('/')
            || name.contains('\\')
        {
            return None;
        }
        Some(self.dir.join(PKGS_DIR).join(format!("{}.json", name)))
    }

    /// Read the descriptor of `name`.
    pub fn lookup(&self, name: &str) -> Result<IndexEntry, ResolveError> {
        let not_found = || ResolveError::PackageNotFound {
            name: name.to_string(),
        };
        let path = self.descriptor_path(name).ok_or_else(not_found)?;
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(ResolveError::io(path, e)),
        };
        serde_json::from_str(&text).map_err(|source| ResolveError::Descriptor { path, source })
    }

    /// Look up `name` and check that `version` is published.
    pub fn resolve(&self, name: &str, version: &str) -> Result<RequiredPackage, ResolveError> {
        let entry = self.lookup(name)?;
        if !entry.has_version(version) {
            return Err(ResolveError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
                published: entry.versions,
            });
        }
        Ok(RequiredPackage {
            name: name.to_string(),
            version: version.to_string(),
            download_url: Some(entry.download_url),
        })
    }
}
