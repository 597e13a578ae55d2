// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, bail};
use rusqlite::Connection;
use serde::Serialize;

use crate::models::Session;
use crate::session;
use crate::store::{LedgerStore, RecordQuery, SqliteLedgerStore, format_ts};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("ledger", sub)) => {
            let s = session::current(conn)?;
            export_ledger(conn, &s, sub)
        }
        _ => Ok(()),
    }
}

/// One exported line; income and expenses share the same columns.
#[derive(Debug, Serialize)]
pub struct ExportRow {
    pub kind: &'static str,
    pub occurred_at: String,
    pub label: String,
    pub amount: String,
    pub description: String,
}

/// All of the user's records, oldest first, income before expenses on ties.
pub fn export_rows(conn: &Connection, s: &Session) -> Result<Vec<ExportRow>> {
    let store = SqliteLedgerStore::new(conn);
    let q = RecordQuery::default();
    let mut rows: Vec<ExportRow> = store
        .income(s, &q)?
        .into_iter()
        .map(|r| ExportRow {
            kind: "income",
            occurred_at: format_ts(r.occurred_at),
            label: r.source,
            amount: r.amount.to_string(),
            description: r.description.unwrap_or_default(),
        })
        .collect();
    rows.extend(store.expenses(s, &q)?.into_iter().map(|r| ExportRow {
        kind: "expense",
        occurred_at: format_ts(r.occurred_at),
        label: r.category,
        amount: r.amount.to_string(),
        description: r.description.unwrap_or_default(),
    }));
    // Fixed-width UTC timestamps sort chronologically as text.
    rows.sort_by(|a, b| a.occurred_at.cmp(&b.occurred_at));
    Ok(rows)
}

fn export_ledger(conn: &Connection, s: &Session, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();
    let rows = export_rows(conn, s)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            for row in &rows {
                wtr.serialize(row)?;
            }
            wtr.flush()?;
        }
        "json" => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
        _ => bail!("Unknown format: {} (use csv|json)", fmt),
    }
    tracing::info!(rows = rows.len(), path = %out, "ledger exported");
    println!("Exported {} records to {}", rows.len(), out);
    Ok(())
}
