pub mod config;
pub mod diagnostic;
pub mod package;
pub mod span;

// Re-exports: short `reky::X` paths for the CLI and tests
pub use package::cache;
pub use package::error;
pub use package::git;
pub use package::graph;
pub use package::index;
pub use package::layout;
pub use package::manifest;
pub use package::resolve;
pub use package::session;

pub use config::Settings;
pub use package::cache::DependencyCache;
pub use package::error::{ErrorKind, ResolveError};
pub use package::git::{CloneRequest, GitExecutor, Vcs};
pub use package::graph::DependencyGraph;
pub use package::index::PackageIndex;
pub use package::resolve::{fetch_dependencies, Resolution, ResolveStats};
pub use package::session::Session;
