//! sonar-sync CLI
//!
//! Compares a SonarQube quality-profile export with Codacy and builds
//! Codacy coding standards from it.

mod cli;
mod commands;
mod context;
mod error;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands, GlobalArgs};
use commands::ImportOptions;
use context::CommandContext;
use error::{CliError, Result};

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    sonar_sync_core::logging::init(cli.verbose)
        .map_err(|e| CliError::user(format!("Failed to initialize logging: {}", e)))?;
    tracing::debug!("Verbose mode enabled");

    match cli.command {
        Some(cmd) => execute_command(cmd, &cli.global),
        None => {
            println!(
                "{} Sync SonarQube rule exports with Codacy",
                "sonar-sync".green().bold()
            );
            println!();
            println!("Run {} for available commands.", "sonar-sync --help".cyan());
            Ok(())
        }
    }
}

fn execute_command(cmd: Commands, global: &GlobalArgs) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let ctx = CommandContext::from_args(&cwd, global)?;

    match cmd {
        Commands::Check { json } => commands::run_check(&ctx, json),
        Commands::Defaults { json } => commands::run_defaults(&ctx, json),
        Commands::Verify { standard_id, json } => commands::run_verify(&ctx, standard_id, json),
        Commands::Import {
            standard_name,
            output_dir,
            dry_run,
            json,
        } => commands::run_import(
            &ctx,
            &ImportOptions {
                standard_name,
                output_dir,
                dry_run,
                json,
            },
        ),
        Commands::ProbeDefaults {
            standard_name,
            json,
        } => commands::run_probe(&ctx, &standard_name, json),
    }
}
