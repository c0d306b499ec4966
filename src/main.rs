use clap::{Parser, Subcommand};

mod cli;

use cli::check::{cmd_check, CheckArgs};
use cli::fetch::{cmd_fetch, FetchArgs};
use cli::list::{cmd_list, ListArgs};

#[derive(Parser)]
#[command(
    name = "reky",
    version,
    about = "Reky — git-backed dependency fetcher for Snowball projects"
)]
struct Cli {
    /// Log every resolution pass and git invocation
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resolve, install and cache the dependencies of one or more projects
    Fetch(FetchArgs),
    /// Show declared dependencies and the cached resolution
    List(ListArgs),
    /// Verify that every cached package is installed
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    cli::init_logging(cli.verbose);

    match cli.command {
        Command::Fetch(args) => cmd_fetch(args),
        Command::List(args) => cmd_list(args),
        Command::Check(args) => cmd_check(args),
    }
}
