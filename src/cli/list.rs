use std::path::PathBuf;

use clap::Args;
use reky::manifest::load_declarations;
use reky::DependencyCache;

use super::{fail, project_dir, WorkspaceArgs};

#[derive(Args)]
pub struct ListArgs {
    /// Project root (default: current directory)
    pub project: Option<PathBuf>,
    #[command(flatten)]
    pub workspace: WorkspaceArgs,
}

pub fn cmd_list(args: ListArgs) {
    let root = project_dir(args.project.as_deref());
    let settings = args.workspace.settings(&root);

    let decls = load_declarations(&root).unwrap_or_else(|e| fail(&e));
    if decls.is_empty() {
        println!("No dependencies declared in {}.", reky::manifest::DECLARATION_FILE);
    } else {
        println!("Dependencies ({}):", decls.len());
        for pkg in decls.iter() {
            println!("  {} == {}", pkg.name, pkg.version);
        }
    }

    let cache_path = settings.cache_path();
    if !cache_path.exists() {
        println!("\nNo cached resolution. Run `reky fetch` to resolve.");
        return;
    }
    let cache = DependencyCache::load(&cache_path).unwrap_or_else(|e| fail(&e));
    println!("\nResolved ({}):", cache.len());
    print!("{}", indent(&cache.to_table()));
}

fn indent(table: &str) -> String {
    table.lines().map(|line| format!("  {}\n", line)).collect()
}
