//! trackerctl - inspect work item type schemas and validate field payloads.
//!
//! Commands:
//! - `trackerctl list`: List work item types
//! - `trackerctl show <id>`: Print a type and its resolved schema as YAML
//! - `trackerctl validate <id> <payload.json>`: Validate field values, print them in stored form
//! - `trackerctl check`: Resolve every type and report broken definitions
//!
//! Exit codes:
//! - 0: Success
//! - 1: Error

use clap::Parser;

use trackerctl::commands::{self, open_engine};
use trackerctl::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    tracker_common::init_tracing(cli.debug);

    let exit_code = match run(cli).await {
        Ok(true) => 0,
        Ok(false) => 1,
        Err(e) => {
            eprintln!("Error: {e:#}");
            1
        }
    };
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> anyhow::Result<bool> {
    let engine = open_engine(cli.config.as_deref(), cli.root).await?;
    let mut out = std::io::stdout().lock();
    match cli.command {
        Commands::List => commands::run_list(&engine, &mut out).await.map(|_| true),
        Commands::Show { id } => commands::run_show(&engine, &id, &mut out).await.map(|_| true),
        Commands::Validate { id, payload } => commands::run_validate(&engine, &id, &payload, &mut out)
            .await
            .map(|_| true),
        Commands::Check => commands::run_check(&engine, &mut out).await,
    }
}
