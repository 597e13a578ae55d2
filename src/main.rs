// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use std::process::ExitCode;

use pocketbook::{cli, commands, config::AppConfig, db, errors::Error, utils};

fn run() -> Result<()> {
    let cfg = AppConfig::load()?;
    utils::init_tracing(&cfg.log_filter);

    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let conn = db::open_or_init(&cfg.db_path)?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", cfg.db_path.display());
        }
        Some(("signup", sub)) => commands::auth::signup(&conn, sub)?,
        Some(("signin", sub)) => commands::auth::signin(&conn, sub)?,
        Some(("signout", _)) => commands::auth::signout(&conn)?,
        Some(("profile", sub)) => commands::profile::handle(&conn, sub)?,
        Some(("income", sub)) => commands::income::handle(&conn, sub)?,
        Some(("expense", sub)) => commands::expenses::handle(&conn, sub)?,
        Some(("summary", sub)) => commands::summary::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, sub)?,
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        Some(("config", sub)) => commands::config::handle(&conn, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // Store failures get one generic message; the detail goes to the log.
            let retryable = err.chain().any(|e| {
                e.downcast_ref::<Error>().is_some_and(Error::is_retryable)
                    || e.downcast_ref::<rusqlite::Error>().is_some()
            });
            if retryable {
                tracing::error!(error = ?err, "ledger store failure");
                eprintln!("Error: could not reach the ledger store. Please try again.");
            } else {
                eprintln!("Error: {:#}", err);
            }
            ExitCode::FAILURE
        }
    }
}
