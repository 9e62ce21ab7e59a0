//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Remod - Remote modules, cached locally
///
/// Downloads http(s) module imports for bundler pipelines and keeps
/// them in a local cache governed by the freshness headers they
/// arrived with.
#[derive(Parser, Debug)]
#[command(name = "remod")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "REMOD_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Download modules through the cache
    Fetch(FetchArgs),

    /// Explain how an import specifier resolves
    Resolve(ResolveArgs),

    /// Inspect and manage the module cache
    Cache(CacheArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

/// Arguments for the fetch command
#[derive(Parser, Debug)]
pub struct FetchArgs {
    /// Module URLs to fetch
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Write the module body to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Bypass the cache and download again
    #[arg(short, long)]
    pub reload: bool,

    /// Serve cached entries within their max-stale window
    #[arg(long)]
    pub accept_stale: bool,

    /// Treat cached entries older than this many seconds as stale
    #[arg(long, value_name = "SECS")]
    pub max_fresh: Option<u64>,
}

/// Arguments for the resolve command
#[derive(Parser, Debug)]
pub struct ResolveArgs {
    /// Import specifier to classify
    pub specifier: String,

    /// URL of the module the import appears in
    #[arg(short, long, value_name = "URL")]
    pub importer: Option<String>,

    /// Output format
    #[arg(short, long, default_value = "table")]
    pub format: OutputFormat,
}

/// Arguments for the cache command
#[derive(Parser, Debug)]
pub struct CacheArgs {
    /// Subcommand for cache
    #[command(subcommand)]
    pub action: CacheAction,
}

/// Cache subcommands
#[derive(Subcommand, Debug)]
pub enum CacheAction {
    /// List cached modules
    List {
        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Show details for one cached module
    Info {
        /// Module URL
        url: String,
    },

    /// Remove one cached module
    Evict {
        /// Module URL
        url: String,
    },

    /// Remove every cached module
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    /// Subcommand for config
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., fetch.timeout_secs)
        key: String,
        /// Value to set
        value: String,
    },
}

/// Output format for listing commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// Simple text (one per line)
    Plain,
}
