//! `evalboard` command line entry point.
//!
//! # Responsibility
//! - Load configuration (`.env` first, then `EVALBOARD_*` variables).
//! - Open the store and hand the parsed command to `commands`.
//! - Map every failure to a one-line message and a non-zero exit code.

mod cli;
mod commands;
mod error;

use clap::Parser;
use cli::Cli;
use error::CliError;
use evalboard_core::{init_logging, open_db, EngineConfig, SqliteStore};
use log::error;
use std::process::ExitCode;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let mut config = EngineConfig::from_env()?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    if let Some(log_dir) = config.log_dir.as_deref() {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = open_db(&config.db_path)?;
    let store = SqliteStore::try_new(&conn)?;
    commands::dispatch(cli.command, store, &config)
}
