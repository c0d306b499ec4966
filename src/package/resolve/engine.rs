use std::path::{Path, PathBuf};

use super::{project_name, Resolution, ResolveStats};
use crate::manifest::load_declarations;
use crate::package::cache::DependencyCache;
use crate::package::error::ResolveError;
use crate::package::git::{CloneRequest, Vcs};
use crate::package::graph::DependencyGraph;
use crate::package::layout::InstallLayout;
use crate::package::session::Session;

/// One entry of the worklist arena.
#[derive(Clone, Debug)]
struct WorkItem {
    path: PathBuf,
    /// Roots are re-read on every pass; package directories only once.
    root: bool,
    processed: bool,
}

pub struct Resolver<'s, V: Vcs> {
    session: &'s mut Session<V>,
    cache: DependencyCache,
    layout: InstallLayout,
    graph: DependencyGraph,
    /// Append-only; a package directory is pushed when its name is first
    /// registered in the cache.
    worklist: Vec<WorkItem>,
    stats: ResolveStats,
}

impl<'s, V: Vcs> Resolver<'s, V> {
    /// Seed the worklist with `roots` followed by the install directory of
    /// every package in `cache`.
    ///
    /// Seeded packages whose directory has gone missing leave the cache
    /// dirty so the first pass reinstalls them.
    pub fn new(
        session: &'s mut Session<V>,
        roots: &[PathBuf],
        mut cache: DependencyCache,
        mut layout: InstallLayout,
    ) -> Self {
        let mut worklist: Vec<WorkItem> = roots
            .iter()
            .map(|path| WorkItem {
                path: path.clone(),
                root: true,
                processed: false,
            })
            .collect();

        let mut missing = false;
        for (name, _) in cache.iter() {
            let path = layout.register(name);
            missing |= !path.is_dir();
            worklist.push(WorkItem {
                path,
                root: false,
                processed: false,
            });
        }

        cache.reset_dirty();
        if missing {
            cache.mark_dirty();
        }

        Self {
            session,
            cache,
            layout,
            graph: DependencyGraph::new(),
            worklist,
            stats: ResolveStats::default(),
        }
    }

    /// Run passes until one leaves the cache clean.
    pub fn run(mut self) -> Result<Resolution, ResolveError> {
        loop {
            self.stats.passes += 1;
            let known = self.cache.len();
            self.pass()?;
            if self.cache.len() > known {
                self.stats.expansions += 1;
            }
            tracing::debug!(
                pass = self.stats.passes,
                worklist = self.worklist.len(),
                packages = self.cache.len(),
                "resolution pass finished"
            );

            if !self.cache.is_dirty() {
                break;
            }
            self.session.ensure_index()?;
            self.install_pending()?;
            self.cache.reset_dirty();
        }

        Ok(Resolution {
            cache: self.cache,
            graph: self.graph,
            layout: self.layout,
            stats: self.stats,
        })
    }

    /// Visit every worklist entry that existed when the pass started.
    /// Entries appended during the pass wait for the next one.
    fn pass(&mut self) -> Result<(), ResolveError> {
        let end = self.worklist.len();
        for idx in 0..end {
            let item = &self.worklist[idx];
            if item.processed && !item.root {
                continue;
            }
            // Not cloned yet: retried once the install step has run.
            if !item.root && !item.path.is_dir() {
                continue;
            }
            let path = item.path.clone();
            self.visit(&path)?;
            self.worklist[idx].processed = true;
        }
        Ok(())
    }

    fn node_name(&self, path: &Path) -> String {
        match self.layout.name_for_path(path) {
            Some(name) => name.to_string(),
            None => project_name(path),
        }
    }

    /// Parse one project's declarations and fold them into the cache.
    fn visit(&mut self, path: &Path) -> Result<(), ResolveError> {
        let node = self.node_name(path);
        let decls = load_declarations(path)?;
        tracing::debug!(node = %node, path = %path.display(), declared = decls.len(), "visiting");

        self.graph
            .set_edges(&node, decls.iter().map(|pkg| pkg.name).collect());

        for pkg in decls.iter() {
            match self.cache.get(&pkg.name) {
                None => {
                    self.cache.add(&pkg.name, &pkg.version);
                    let dir = self.layout.register(&pkg.name);
                    tracing::debug!(package = %pkg.name, version = %pkg.version, required_by = %node, "registered");
                    self.worklist.push(WorkItem {
                        path: dir,
                        root: false,
                        processed: false,
                    });
                }
                Some(cached) if cached == pkg.version => {}
                Some(cached) => {
                    return Err(ResolveError::Conflict {
                        name: pkg.name,
                        cached: cached.to_string(),
                        requested: pkg.version,
                        requirer: node,
                    });
                }
            }
        }
        Ok(())
    }

    /// Clone every cached package that has no install directory yet.
    /// The index has already been refreshed for this run.
    fn install_pending(&mut self) -> Result<(), ResolveError> {
        let pending: Vec<(String, String)> = self
            .cache
            .iter()
            .filter(|(name, _)| !self.layout.is_installed(name))
            .map(|(name, version)| (name.to_string(), version.to_string()))
            .collect();
        if pending.is_empty() {
            return Ok(());
        }

        let deps_dir = self.layout.deps_dir().to_path_buf();
        std::fs::create_dir_all(&deps_dir).map_err(|e| ResolveError::io(&deps_dir, e))?;

        for (name, version) in &pending {
            self.install(name, version)?;
        }
        Ok(())
    }

    fn install(&mut self, name: &str, version: &str) -> Result<(), ResolveError> {
        let pkg = self.session.index().resolve(name, version)?;
        let Some(url) = pkg.download_url else {
            return Err(ResolveError::PackageNotFound {
                name: name.to_string(),
            });
        };
        let dest = self.layout.install_dir(name);

        tracing::info!("Download {}@{}", name, version);
        self.session
            .vcs()
            .clone_repo(&CloneRequest::pinned(&url, &dest, version))?;
        self.layout.write_sidecar(name)?;
        self.stats.installed += 1;
        Ok(())
    }
}
