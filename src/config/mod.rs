pub mod toml_config;

pub use toml_config::{SolverConfig, StorageBackend};

#[cfg(feature = "cli")]
use clap::Parser;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "webhook-solver")]
#[command(about = "Register, pick the query for your identifier and submit it to the webhook")]
pub struct CliConfig {
    /// Path to TOML configuration file
    #[arg(short, long, default_value = "webhook-solver.toml")]
    pub config: String,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub json_logs: bool,

    /// Resolve parity and select the query without any network or storage calls
    #[arg(long)]
    pub dry_run: bool,
}
