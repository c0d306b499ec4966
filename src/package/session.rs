use super::error::ResolveError;
use super::git::{GitExecutor, Vcs};
use super::index::{PackageIndex, Refresh};
use crate::config::Settings;

/// State of one resolution run.
///
/// Holds what would otherwise be process-wide: the git front end and
/// whether the package index has been refreshed yet.
pub struct Session<V: Vcs> {
    settings: Settings,
    vcs: V,
    index: PackageIndex,
}

impl<V: Vcs> Session<V> {
    pub fn new(settings: Settings, vcs: V) -> Self {
        let index = PackageIndex::new(&settings.index_url, &settings.index_dir);
        Self {
            settings,
            vcs,
            index,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn vcs(&self) -> &V {
        &self.vcs
    }

    pub fn index(&self) -> &PackageIndex {
        &self.index
    }

    /// Refresh the package index, at most once per session.
    pub fn ensure_index(&mut self) -> Result<Refresh, ResolveError> {
        self.index.ensure_fresh(&self.vcs)
    }
}

impl Session<GitExecutor> {
    /// Session driving the git binary named in `settings`.
    pub fn with_git(settings: Settings) -> Self {
        let git = GitExecutor::new(settings.git.clone());
        Self::new(settings, git)
    }
}
