//! Fetcher configuration.
//!
//! Paths and URLs come from three layers, highest priority first:
//! 1. command-line flags (applied by the CLI on top of a `Settings`)
//! 2. environment: `REKY_HOME`, `REKY_INDEX_URL`, `REKY_GIT`
//! 3. defaults derived from the workspace and `$HOME`
//!
//! Layout:
//! ```text
//! <workspace>/            (default: <project>/.sn)
//! ├── deps/               install directories
//! └── reky/.reky_cache    resolved set
//! <home>/                 (default: ~/.snowball)
//! └── packages/           package index clone
//! ```

use std::path::{Path, PathBuf};

use crate::cache::CACHE_FILE;
use crate::index::DEFAULT_INDEX_URL;

/// Workspace directory created inside a project when none is given.
pub const DEFAULT_WORKSPACE: &str = ".sn";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Settings {
    pub workspace: PathBuf,
    /// Where packages are installed.
    pub deps_dir: PathBuf,
    /// Where the cache file lives.
    pub state_dir: PathBuf,
    pub home: PathBuf,
    /// Local clone of the package index.
    pub index_dir: PathBuf,
    pub index_url: String,
    /// Git binary to invoke.
    pub git: PathBuf,
    /// Ignore the previously persisted resolution.
    pub fresh: bool,
}

impl Settings {
    /// Defaults only; the environment is not consulted.
    pub fn new(workspace: &Path, home: &Path) -> Self {
        Self {
            workspace: workspace.to_path_buf(),
            deps_dir: workspace.join("deps"),
            state_dir: workspace.join("reky"),
            home: home.to_path_buf(),
            index_dir: home.join("packages"),
            index_url: DEFAULT_INDEX_URL.to_string(),
            git: PathBuf::from("git"),
            fresh: false,
        }
    }

    /// Defaults with environment overrides applied.
    pub fn from_env(workspace: &Path) -> Self {
        let home = home_dir().unwrap_or_else(|| PathBuf::from(".snowball"));
        let mut settings = Self::new(workspace, &home);
        if let Ok(url) = std::env::var("REKY_INDEX_URL") {
            settings.index_url = url;
        }
        settings.git = git_program();
        settings
    }

    /// Move the home directory, keeping the index inside it.
    pub fn with_home(mut self, home: &Path) -> Self {
        self.home = home.to_path_buf();
        self.index_dir = home.join("packages");
        self
    }

    pub fn cache_path(&self) -> PathBuf {
        self.state_dir.join(CACHE_FILE)
    }
}

/// Resolve the fetcher home directory.
///
/// Priority:
/// 1. `$REKY_HOME`
/// 2. `~/.snowball/`
pub fn home_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("REKY_HOME") {
        return Some(PathBuf::from(dir));
    }
    std::env::var("HOME")
        .ok()
        .map(|home| PathBuf::from(home).join(".snowball"))
}

/// Git binary: `$REKY_GIT`, else the first `git` on `PATH`, else `git`.
pub fn git_program() -> PathBuf {
    if let Ok(git) = std::env::var("REKY_GIT") {
        return PathBuf::from(git);
    }
    which::which("git").unwrap_or_else(|_| PathBuf::from("git"))
}
