//! Synchronous git invocation.
//!
//! Every command runs to completion before control returns; there is no
//! timeout and no retry. A `-q` flag is appended to each invocation.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use super::error::ResolveError;

/// A clone of `url` into `dest`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CloneRequest<'a> {
    pub url: &'a str,
    pub dest: &'a Path,
    /// Branch or tag to check out.
    pub branch: Option<&'a str>,
    /// Shallow history depth.
    pub depth: Option<u32>,
    /// Pass `-c advice.detachedHead=false`.
    pub quiet_detached_head: bool,
}

impl<'a> CloneRequest<'a> {
    /// Full clone, as used for the package index.
    pub fn full(url: &'a str, dest: &'a Path) -> Self {
        Self {
            url,
            dest,
            branch: None,
            depth: None,
            quiet_detached_head: false,
        }
    }

    /// Shallow clone pinned to `version`, as used for package installs.
    pub fn pinned(url: &'a str, dest: &'a Path, version: &'a str) -> Self {
        Self {
            url,
            dest,
            branch: Some(version),
            depth: Some(1),
            quiet_detached_head: true,
        }
    }
}

/// Version-control operations the resolver needs.
pub trait Vcs {
    fn clone_repo(&self, request: &CloneRequest<'_>) -> Result<(), ResolveError>;
    fn pull(&self, dir: &Path) -> Result<(), ResolveError>;
}

/// Shells out to a git binary.
#[derive(Clone, Debug)]
pub struct GitExecutor {
    program: PathBuf,
}

impl GitExecutor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Arguments for a clone, without the trailing quiet flag.
    pub fn clone_args(request: &CloneRequest<'_>) -> Vec<OsString> {
        let mut args: Vec<OsString> = vec!["clone".into()];
        if request.quiet_detached_head {
            args.push("-c".into());
            args.push("advice.detachedHead=false".into());
        }
        args.push(request.url.into());
        args.push(request.dest.as_os_str().to_owned());
        if let Some(branch) = request.branch {
            args.push("--branch".into());
            args.push(branch.into());
        }
        if let Some(depth) = request.depth {
            args.push("--depth".into());
            args.push(depth.to_string().into());
        }
        args
    }

    /// Arguments for a pull inside `dir`, without the trailing quiet flag.
    pub fn pull_args(dir: &Path) -> Vec<OsString> {
        vec!["-C".into(), dir.as_os_str().to_owned(), "pull".into()]
    }

    /// Run git with `args` plus `-q` and wait for it to exit.
    pub fn run(&self, args: &[OsString]) -> std::io::Result<ExitStatus> {
        tracing::debug!(git = %self.program.display(), args = ?args, "running git");
        Command::new(&self.program).args(args).arg("-q").status()
    }

    fn run_checked(&self, args: Vec<OsString>) -> Result<(), ResolveError> {
        let status = self
            .run(&args)
            .map_err(|source| ResolveError::GitUnavailable {
                program: self.program.clone(),
                source,
            })?;
        if status.success() {
            return Ok(());
        }
        let rendered: Vec<String> = args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        Err(ResolveError::Subprocess {
            command: format!("git {} -q", rendered.join(" ")),
            status,
        })
    }
}

impl Vcs for GitExecutor {
    fn clone_repo(&self, request: &CloneRequest<'_>) -> Result<(), ResolveError> {
        self.run_checked(Self::clone_args(request))
    }

    fn pull(&self, dir: &Path) -> Result<(), ResolveError> {
        self.run_checked(Self::pull_args(dir))
    }
}
