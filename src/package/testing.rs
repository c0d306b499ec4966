//! In-process stand-in for git used by the unit tests.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::Path;

use super::error::ResolveError;
use super::git::{CloneRequest, Vcs};
use crate::manifest::DECLARATION_FILE;

pub(crate) fn package_url(name: &str) -> String {
    format!("https://git.example/{}.git", name)
}

#[derive(Default)]
pub(crate) struct FakeVcs {
    /// Package name → descriptor JSON placed under `pkgs/` on index clone.
    descriptors: BTreeMap<String, String>,
    /// (url, tag) → declaration file of that checkout.
    repos: BTreeMap<(String, String), String>,
    pub(crate) fail_pull: bool,
    pub(crate) calls: RefCell<Vec<String>>,
}

impl FakeVcs {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Publish `name` at every version in `releases`, each with its own
    /// declaration file text.
    pub(crate) fn publish(&mut self, name: &str, releases: &[(&str, &str)]) {
        let url = package_url(name);
        let versions: Vec<String> = releases.iter().map(|(v, _)| format!("\"{}\"", v)).collect();
        self.descriptors.insert(
            name.to_string(),
            format!(
                "{{\"versions\": [{}], \"download_url\": \"{}\"}}",
                versions.join(", "),
                url
            ),
        );
        for (version, decls) in releases {
            self.repos
                .insert((url.clone(), version.to_string()), decls.to_string());
        }
    }

    /// Keep `version` listed in the index but make its checkout fail.
    pub(crate) fn withdraw(&mut self, name: &str, version: &str) {
        self.repos
            .remove(&(package_url(name), version.to_string()));
    }

    /// Package clones performed so far, as `name@version` URLs.
    pub(crate) fn installs(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| c.strip_prefix("install ").map(str::to_string))
            .collect()
    }

    pub(crate) fn write_index(&self, dest: &Path) -> Result<(), ResolveError> {
        let pkgs = dest.join("pkgs");
        std::fs::create_dir_all(&pkgs).map_err(|e| ResolveError::io(&pkgs, e))?;
        for (name, json) in &self.descriptors {
            let path = pkgs.join(format!("{}.json", name));
            std::fs::write(&path, json).map_err(|e| ResolveError::io(&path, e))?;
        }
        Ok(())
    }
}

fn failure(what: &str) -> ResolveError {
    ResolveError::GitUnavailable {
        program: "fake-git".into(),
        source: std::io::Error::new(std::io::ErrorKind::Other, what.to_string()),
    }
}

impl Vcs for FakeVcs {
    fn clone_repo(&self, request: &CloneRequest<'_>) -> Result<(), ResolveError> {
        let Some(tag) = request.branch else {
            self.calls.borrow_mut().push("clone-index".to_string());
            return self.write_index(request.dest);
        };
        self.calls
            .borrow_mut()
            .push(format!("install {}@{}", request.url, tag));
        let decls = self
            .repos
            .get(&(request.url.to_string(), tag.to_string()))
            .ok_or_else(|| failure("remote branch not found"))?;
        std::fs::create_dir_all(request.dest).map_err(|e| ResolveError::io(request.dest, e))?;
        let path = request.dest.join(DECLARATION_FILE);
        std::fs::write(&path, decls).map_err(|e| ResolveError::io(&path, e))
    }

    fn pull(&self, dir: &Path) -> Result<(), ResolveError> {
        self.calls.borrow_mut().push("pull-index".to_string());
        if self.fail_pull {
            return Err(failure("network unreachable"));
        }
        self.write_index(dir)
    }
}
