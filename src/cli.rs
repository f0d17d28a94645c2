use clap::{Parser, Subcommand};

/// tagdex - ctags-backed code index and search
#[derive(Parser, Debug)]
#[command(name = "tagdex", version, about)]
pub struct Cli {
    /// Output results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Rebuild the symbol index from scratch
    Build,

    /// Update the index if tracked source files changed
    Update,

    /// Search the symbol index (with a content-grep fallback)
    Query(QueryArgs),

    /// Poll for changes and keep the index updated
    Watch(WatchArgs),

    /// Show index statistics
    Stats,
}

#[derive(clap::Args, Debug)]
pub struct QueryArgs {
    /// Free-text query; all terms must match
    pub text: String,

    /// Maximum number of results
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Skip the content-grep fallback, symbol hits only
    #[arg(long)]
    pub no_grep: bool,
}

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Polling interval in seconds (defaults to the configured value)
    #[arg(long)]
    pub interval: Option<u64>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
