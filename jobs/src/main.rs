//! Scheduled jobs for the lablog project.
//!
//! Reconciles the last day of student timelines against the student logs:
//! missing logs are synthesized and every pending log is confirmed.
//! Meant to be run from cron, one instance at a time.

#![warn(clippy::all, clippy::pedantic)]

use anyhow::{Context, Result};
use clap::Parser;
use lablog_common::db_util;
use lablog_common::job::{JobOptions, run_reconciliation};
use lablog_common::{CommitMode, MissingLookupPolicy};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// The SQLite database to reconcile (falls back to `.env`)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// What to do with a missing log whose student, schedule or room cannot be found
    #[arg(
        long,
        value_enum,
        default_value = "skip",
        env = "LABLOG_ON_MISSING_LOOKUP"
    )]
    on_missing_lookup: MissingLookupPolicy,

    /// Commit inserts and confirmations together, or in two phases
    #[arg(long, value_enum, default_value = "single", env = "LABLOG_COMMIT_MODE")]
    commit_mode: CommitMode,

    /// How long to wait on a locked database (milliseconds)
    #[arg(long, default_value_t = db_util::DEFAULT_BUSY_TIMEOUT_MS, env = "LABLOG_BUSY_TIMEOUT_MS")]
    busy_timeout_ms: u32,

    /// Report what would change without writing anything
    #[arg(long, env = "LABLOG_DRY_RUN")]
    dry_run: bool,

    /// Print the run report as JSON
    #[arg(long)]
    json: bool,

    /// Print every log in the window after the run, one JSON object per line
    #[arg(long)]
    show_logs: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    // get db connection
    let database_url = match cli.database_url {
        Some(url) => url,
        None => db_util::database_url_from_env()?,
    };
    let mut conn = db_util::get_database_connection(&database_url, cli.busy_timeout_ms)
        .context("opening the log database")?;
    log::info!("Database connection established. Reconciliation started.");

    let options = JobOptions {
        on_missing_lookup: cli.on_missing_lookup,
        commit_mode: cli.commit_mode,
        dry_run: cli.dry_run,
    };
    let now = chrono::Local::now().naive_local();
    let report = run_reconciliation(&mut conn, now, &options).context("reconciling logs")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    if cli.show_logs {
        for log in db_util::get_student_logs_since(&mut conn, report.cutoff)? {
            println!("{}", serde_json::to_string(&log)?);
        }
    }
    Ok(())
}
