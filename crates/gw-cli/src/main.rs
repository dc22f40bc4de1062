//! Groundwork CLI - schema migration and bootstrap coordination

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, MigrateAction};
use commands::common::ExitCode;
use commands::{status, up, verify};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match &cli.command {
        cli::Commands::Migrate(args) => match &args.action {
            MigrateAction::Up(up_args) => up::execute(up_args, &cli.global).await,
            MigrateAction::Status(status_args) => status::execute(status_args, &cli.global).await,
            MigrateAction::Verify(verify_args) => verify::execute(verify_args, &cli.global).await,
        },
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
