// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use std::sync::Once;

use crate::aggregator::{Calendar, ChartPoint, percent_of};
use crate::models::check_amount;

static TRACING_INIT: Once = Once::new();

/// Installs the global subscriber once. Logs go to stderr so that `--json`
/// output on stdout stays machine-readable.
pub fn init_tracing(filter: &str) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt};

        let filter = EnvFilter::try_new(filter)
            .unwrap_or_else(|_| EnvFilter::new(crate::config::DEFAULT_LOG_FILTER));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// `YYYY-MM` into (year, month).
pub fn parse_month(s: &str) -> Result<(i32, u32)> {
    let d = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}', expected YYYY-MM", s))?;
    Ok((d.year(), d.month()))
}

/// A plain date (midnight in `cal`) or a full RFC 3339 timestamp.
pub fn parse_when(s: &str, cal: Calendar) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    let d = parse_date(s)?;
    Ok(cal.start_of_day(d)?)
}

/// Amounts entered by the user: never negative, at most
/// [`MAX_AMOUNT`](crate::models::MAX_AMOUNT), at most four decimal places.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = s
        .trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s))?;
    if d < Decimal::ZERO {
        bail!("Amount must not be negative (got {})", d);
    }
    check_amount(d)?;
    Ok(d)
}

pub fn fmt_money(d: &Decimal, symbol: &str) -> String {
    if d.is_sign_negative() && !d.is_zero() {
        format!("-{}{:.2}", symbol, d.abs())
    } else {
        format!("{}{:.2}", symbol, d)
    }
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Number of `width` cells that `part` fills when `whole` fills all of them.
fn cells(part: Decimal, whole: Decimal, width: usize) -> usize {
    part.checked_div(whole)
        .and_then(|r| r.checked_mul(Decimal::from(width)))
        .and_then(|c| c.round().to_usize())
        .unwrap_or(0)
        .min(width)
}

/// Horizontal text bars scaled so the largest value spans `width` cells.
pub fn render_bars(points: &[ChartPoint], width: usize) -> Vec<String> {
    let max = points
        .iter()
        .map(|p| p.value)
        .max()
        .unwrap_or(Decimal::ZERO);
    let label_w = points.iter().map(|p| p.label.len()).max().unwrap_or(0);
    points
        .iter()
        .map(|p| {
            let n = cells(p.value, max, width);
            format!("{:<w$} | {} {:.2}", p.label, "#".repeat(n), p.value, w = label_w)
        })
        .collect()
}

/// Bars for a proportion series: each point's share of the series total,
/// with `width` cells standing for 100%.
pub fn render_shares(points: &[ChartPoint], width: usize) -> Vec<String> {
    let total = points
        .iter()
        .fold(Decimal::ZERO, |acc, p| acc.saturating_add(p.value));
    let label_w = points.iter().map(|p| p.label.len()).max().unwrap_or(0);
    points
        .iter()
        .map(|p| {
            let n = cells(p.value, total, width);
            let pct = percent_of(p.value, total)
                .map(|v| format!("{:.2}%", v))
                .unwrap_or_else(|| "-".into());
            format!("{:<w$} | {} {}", p.label, "#".repeat(n), pct, w = label_w)
        })
        .collect()
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // Arrays stream one element per line.
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
