// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rusqlite::Connection;

use crate::aggregator::{Calendar, RecencyWindow};
use crate::config;
use crate::store::RecordQuery;
use crate::utils::{parse_month, parse_when};

/// Store query plus the recency window to apply afterwards.
pub struct ListArgs {
    pub query: RecordQuery,
    pub window: RecencyWindow,
}

pub fn list_args(conn: &Connection, sub: &clap::ArgMatches, label_arg: &str) -> Result<ListArgs> {
    let window = match sub.get_one::<String>("within") {
        Some(w) => w.parse::<RecencyWindow>()?,
        None => RecencyWindow::All,
    };
    let mut query = match sub.get_one::<String>("month") {
        Some(m) => {
            let (y, mo) = parse_month(m)?;
            RecordQuery::within(&config::calendar(conn)?.month(y, mo)?)
        }
        None => RecordQuery::default(),
    };
    query.label = sub
        .get_one::<String>(label_arg)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());
    query.limit = sub.get_one::<usize>("limit").copied();
    Ok(ListArgs { query, window })
}

/// `--date` if given, otherwise `now`.
pub fn occurred_at(
    sub: &clap::ArgMatches,
    cal: Calendar,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>> {
    match sub.get_one::<String>("date") {
        Some(s) => parse_when(s, cal),
        None => Ok(now),
    }
}

pub fn description(sub: &clap::ArgMatches) -> Option<String> {
    sub.get_one::<String>("description").map(|s| s.to_string())
}

pub fn fmt_when(at: DateTime<Utc>, cal: Calendar) -> String {
    match cal {
        Calendar::Local => at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string(),
        Calendar::Utc => at.format("%Y-%m-%d %H:%M UTC").to_string(),
    }
}
