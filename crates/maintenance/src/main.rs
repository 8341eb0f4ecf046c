#![warn(clippy::pedantic)]

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use log::info;
use treino_domain::{self as domain, DeduplicationService, ExerciseService};
use treino_storage::Sqlite;

mod logger;
mod output;

/// Maintenance jobs for the exercise catalog.
#[derive(Parser, Debug)]
#[command(version)]
struct Args {
    /// SQLite database file
    #[arg(long, env = "TREINO_DATABASE", default_value = "treino.db")]
    database: PathBuf,

    /// Increase log verbosity
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
enum Command {
    /// Deactivate or delete duplicate exercises
    Dedup {
        /// Report the decisions without changing the database
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show the number of active exercises per muscle group
    Summary,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    logger::init(logger::level(args.verbose, args.quiet))
        .context("failed to initialize logger")?;

    let storage = Sqlite::open(&args.database)
        .with_context(|| format!("failed to open database {}", args.database.display()))?;
    let service = domain::Service::new(storage);

    match args.command {
        Command::Dedup { dry_run, json } => {
            let mode = if dry_run {
                domain::Mode::DryRun
            } else {
                domain::Mode::Apply
            };
            let report = service
                .resolve_duplicates(mode)
                .await
                .context("failed to load exercise catalog")?;

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&output::ReportJson::from(&report))?
                );
            } else {
                println!("{}", output::ReportText(&report));
            }

            if report.failed() > 0 {
                info!("{} pairs failed, re-run to retry", report.failed());
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Summary => {
            let exercises = service
                .get_exercises()
                .await
                .context("failed to load exercise catalog")?;
            println!(
                "{}",
                output::SummaryText(&domain::catalog_summary(&exercises))
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}
