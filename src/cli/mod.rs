pub mod check;
pub mod fetch;
pub mod list;

use std::path::{Path, PathBuf};
use std::process;

use clap::Args;
use reky::{ResolveError, Settings};

/// Workspace and index options shared by every subcommand.
#[derive(Args, Clone, Debug, Default)]
pub struct WorkspaceArgs {
    /// Workspace holding installed packages and the cache (default: <project>/.sn)
    #[arg(long, value_name = "DIR")]
    pub workspace: Option<PathBuf>,
    /// Fetcher home holding the package index (default: $REKY_HOME or ~/.snowball)
    #[arg(long, value_name = "DIR")]
    pub home: Option<PathBuf>,
    /// Package index repository (default: $REKY_INDEX_URL or the Snowball index)
    #[arg(long, value_name = "URL")]
    pub index_url: Option<String>,
    /// Git binary (default: $REKY_GIT or git on PATH)
    #[arg(long, value_name = "PATH")]
    pub git: Option<PathBuf>,
}

impl WorkspaceArgs {
    /// Settings for a run rooted at `project`: env defaults, then flags.
    pub fn settings(&self, project: &Path) -> Settings {
        let workspace = self
            .workspace
            .as_deref()
            .map(absolute)
            .unwrap_or_else(|| project.join(reky::config::DEFAULT_WORKSPACE));

        let mut settings = Settings::from_env(&workspace);
        if let Some(home) = &self.home {
            settings = settings.with_home(&absolute(home));
        }
        if let Some(url) = &self.index_url {
            settings.index_url = url.clone();
        }
        if let Some(git) = &self.git {
            settings.git = git.clone();
        }
        settings
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}

/// Make `path` absolute against the current directory.
pub fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Resolve a project argument to an existing directory.
pub fn project_dir(input: Option<&Path>) -> PathBuf {
    let dir = absolute(input.unwrap_or(Path::new(".")));
    if !dir.is_dir() {
        eprintln!("error: '{}' is not a project directory", dir.display());
        process::exit(1);
    }
    dir
}

/// Render `err` through the diagnostic renderer and exit.
pub fn fail(err: &ResolveError) -> ! {
    err.report();
    process::exit(1);
}
