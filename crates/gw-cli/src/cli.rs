//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Groundwork - schema migration and bootstrap coordination
#[derive(Parser, Debug)]
#[command(name = "gw")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Migration operations
    Migrate(MigrateArgs),
}

/// Arguments for the migrate command group
#[derive(Args, Debug)]
pub struct MigrateArgs {
    #[command(subcommand)]
    pub action: MigrateAction,
}

/// Migration subcommands
#[derive(Subcommand, Debug)]
pub enum MigrateAction {
    /// Run the full bootstrap: lock, apply pending migrations, validate
    Up(UpArgs),

    /// Show ledger state for every migration in the catalog
    Status(StatusArgs),

    /// Check catalog, dependency order, drift, and schema without executing SQL
    Verify(VerifyArgs),
}

/// Arguments for migrate up
#[derive(Args, Debug)]
pub struct UpArgs {
    /// Override the lock acquisition timeout in milliseconds
    #[arg(long)]
    pub lock_timeout_ms: Option<u64>,
}

/// Arguments for migrate status
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub output: StatusOutput,
}

/// Status output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusOutput {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

/// Arguments for migrate verify
#[derive(Args, Debug)]
pub struct VerifyArgs {}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
