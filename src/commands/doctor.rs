// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::store::parse_ts;
use crate::utils::pretty_table;

/// Data-quality problems a summary would silently absorb.
pub fn issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    for (table, label_col) in [("income", "source"), ("expenses", "category")] {
        // 1) Amounts that are negative or not decimals at all
        let mut stmt = conn.prepare(&format!(
            "SELECT id, amount, occurred_at, TRIM({}) FROM {} ORDER BY id",
            label_col, table
        ))?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let amount: String = r.get(1)?;
            let at: String = r.get(2)?;
            let label: String = r.get(3)?;
            match amount.parse::<Decimal>() {
                Ok(d) if d < Decimal::ZERO => {
                    rows.push(vec![
                        "negative_amount".into(),
                        format!("{} #{} = {}", table, id, amount),
                    ]);
                }
                Ok(_) => {}
                Err(_) => rows.push(vec![
                    "bad_amount".into(),
                    format!("{} #{} = '{}'", table, id, amount),
                ]),
            }
            // 2) Timestamps the store cannot read back
            if parse_ts(&at).is_err() {
                rows.push(vec![
                    "bad_timestamp".into(),
                    format!("{} #{} = '{}'", table, id, at),
                ]);
            }
            // 3) Blank labels
            if label.is_empty() {
                rows.push(vec![
                    format!("blank_{}", label_col),
                    format!("{} #{}", table, id),
                ]);
            }
        }

        // 4) Records whose owner no longer exists
        let mut stmt = conn.prepare(&format!(
            "SELECT t.id, t.user_id FROM {} t LEFT JOIN users u ON u.id = t.user_id
             WHERE u.id IS NULL ORDER BY t.id",
            table
        ))?;
        let orphans = stmt.query_map([], |r| Ok((r.get::<_, i64>(0)?, r.get::<_, String>(1)?)))?;
        for o in orphans {
            let (id, user) = o?;
            rows.push(vec![
                "orphan_record".into(),
                format!("{} #{} (user {})", table, id, user),
            ]);
        }
    }
    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        tracing::warn!(count = rows.len(), "doctor found data-quality issues");
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
