// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::aggregator::{filter_by_recency, sort_newest_first};
use crate::commands::records::{description, fmt_when, list_args, occurred_at};
use crate::config;
use crate::models::{IncomeRecord, NewIncome, Session};
use crate::session;
use crate::store::{LedgerStore, SqliteLedgerStore};
use crate::utils::{fmt_money, maybe_print_json, parse_amount, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let session = session::current(conn)?;
    match m.subcommand() {
        Some(("add", sub)) => add(conn, &session, sub)?,
        Some(("list", sub)) => list(conn, &session, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let cal = config::calendar(conn)?;
    let new = NewIncome {
        source: sub.get_one::<String>("source").unwrap().to_string(),
        amount: parse_amount(sub.get_one::<String>("amount").unwrap())?,
        description: description(sub),
        occurred_at: occurred_at(sub, cal, Utc::now())?,
    };
    let rec = SqliteLedgerStore::new(conn).add_income(session, new)?;
    println!(
        "Recorded income {} from '{}' on {}",
        fmt_money(&rec.amount, &config::currency_symbol(conn)?),
        rec.source,
        fmt_when(rec.occurred_at, cal)
    );
    Ok(())
}

fn list(conn: &Connection, session: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(conn, session, sub, Utc::now())?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        if data.is_empty() {
            println!("No income recorded yet");
            return Ok(());
        }
        let cal = config::calendar(conn)?;
        let sym = config::currency_symbol(conn)?;
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    fmt_when(r.occurred_at, cal),
                    r.source.clone(),
                    fmt_money(&r.amount, &sym),
                    r.description.clone().unwrap_or_default(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["When", "Source", "Amount", "Description"], rows)
        );
    }
    Ok(())
}

/// Income matching the list flags, newest first, with the recency window
/// evaluated against `now`.
pub fn query_rows(
    conn: &Connection,
    session: &Session,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<Vec<IncomeRecord>> {
    let args = list_args(conn, sub, "source")?;
    let rows = SqliteLedgerStore::new(conn).income(session, &args.query)?;
    let mut rows = filter_by_recency(rows, args.window, now);
    sort_newest_first(&mut rows);
    Ok(rows)
}
