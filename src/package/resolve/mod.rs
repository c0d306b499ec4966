//! Transitive dependency resolution.
//!
//! Starting from a set of project roots, the resolver repeatedly parses
//! declaration files, registers newly seen packages, and installs them,
//! until a pass discovers nothing new. Each package name enters the
//! worklist at most once, so the loop terminates after at most one
//! expanding pass per distinct package.

use std::path::{Path, PathBuf};

use super::cache::DependencyCache;
use super::error::ResolveError;
use super::git::Vcs;
use super::graph::DependencyGraph;
use super::layout::InstallLayout;
use super::session::Session;

mod engine;

pub use engine::Resolver;

/// Counters describing how a run converged.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ResolveStats {
    /// Passes over the worklist, including the final one that found nothing.
    pub passes: usize,
    /// Passes that registered at least one new package.
    pub expansions: usize,
    /// Packages cloned during the run.
    pub installed: usize,
}

/// Result of a successful run.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub cache: DependencyCache,
    pub graph: DependencyGraph,
    pub layout: InstallLayout,
    pub stats: ResolveStats,
}

impl Resolution {
    /// Install directory of every resolved package, for use as compiler
    /// search paths.
    pub fn search_paths(&self) -> Vec<PathBuf> {
        self.cache
            .iter()
            .map(|(name, _)| self.layout.install_dir(name))
            .collect()
    }
}

/// Resolve, install and persist the dependencies of `roots`.
///
/// Loads the previous resolution (unless the session asks for a fresh
/// one), runs the resolver to a fixpoint, then writes the cache and the
/// install name index. Nothing is written if the run fails.
pub fn fetch_dependencies<V: Vcs>(
    session: &mut Session<V>,
    roots: &[PathBuf],
) -> Result<Resolution, ResolveError> {
    let settings = session.settings().clone();
    let cache_path = settings.cache_path();

    let cache = if settings.fresh {
        DependencyCache::new()
    } else {
        DependencyCache::load(&cache_path)?
    };
    let layout = InstallLayout::load(&settings.deps_dir)?;

    let resolution = Resolver::new(session, roots, cache, layout).run()?;

    resolution.cache.persist(&cache_path)?;
    resolution.layout.persist()?;
    tracing::debug!(
        cache = %cache_path.display(),
        packages = resolution.cache.len(),
        "resolution persisted"
    );
    Ok(resolution)
}

/// Graph node name for a project root: its own directory name.
pub fn project_name(path: &Path) -> String {
    if let Some(name) = path.file_name() {
        return name.to_string_lossy().into_owned();
    }
    std::fs::canonicalize(path)
        .ok()
        .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests;
