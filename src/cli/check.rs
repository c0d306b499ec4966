use std::path::PathBuf;
use std::process;

use clap::Args;
use reky::layout::InstallLayout;
use reky::DependencyCache;

use super::{fail, project_dir, WorkspaceArgs};

#[derive(Args)]
pub struct CheckArgs {
    /// Project root (default: current directory)
    pub project: Option<PathBuf>,
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

pub fn cmd_check(args: CheckArgs) {
    let root = project_dir(args.project.as_deref());
    let settings = args.workspace.settings(&root);

    let cache_path = settings.cache_path();
    if !cache_path.exists() {
        eprintln!("error: no cached resolution found. Run `reky fetch` first.");
        process::exit(1);
    }
    let cache = DependencyCache::load(&cache_path).unwrap_or_else(|e| fail(&e));
    let layout = InstallLayout::load(&settings.deps_dir).unwrap_or_else(|e| fail(&e));

    let mut ok = true;
    for (name, version) in cache.iter() {
        if layout.is_installed(name) {
            println!("  OK  {} ({})", name, version);
        } else {
            println!("  MISSING  {} ({})", name, version);
            ok = false;
        }
    }
    if ok {
        println!("\nAll dependencies installed.");
    } else {
        println!("\nSome dependencies missing. Run `reky fetch`.");
        process::exit(1);
    }
}
