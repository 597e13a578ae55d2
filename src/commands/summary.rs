// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;

use crate::aggregator::{
    CategoryShare, MonthlySummary, ReportingPeriod, breakdown, cash_flow,
    compute_monthly_summary, percent_of,
};
use crate::config;
use crate::models::Session;
use crate::session;
use crate::store::{LedgerStore, SqliteLedgerStore};
use crate::utils::{
    fmt_money, maybe_print_json, parse_month, pretty_table, render_bars, render_shares,
};

const BAR_WIDTH: usize = 40;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let s = session::current(conn)?;
    let now = Utc::now();
    match m.subcommand() {
        Some(("month", sub)) => month(conn, &s, sub, now)?,
        Some(("cashflow", sub)) => cashflow(conn, &s, sub, now)?,
        Some(("categories", sub)) => categories(conn, &s, sub, now)?,
        _ => {}
    }
    Ok(())
}

fn resolve_period(
    conn: &Connection,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<ReportingPeriod> {
    let cal = config::calendar(conn)?;
    let period = match sub.get_one::<String>("month") {
        Some(m) => {
            let (y, mo) = parse_month(m)?;
            cal.month(y, mo)?
        }
        None => cal.month_of(now)?,
    };
    Ok(period)
}

#[derive(Debug, Serialize)]
pub struct MonthReport {
    pub summary: MonthlySummary,
    /// All records up to the end of the month, when requested.
    pub cumulative: Option<MonthlySummary>,
}

pub fn month_report(
    conn: &Connection,
    s: &Session,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<MonthReport> {
    let period = resolve_period(conn, sub, now)?;
    let store = SqliteLedgerStore::new(conn);
    let ledger = store
        .ledger(s, &period)
        .with_context(|| format!("Fetch ledger for {}", period.label))?;
    let summary = compute_monthly_summary(&ledger.income, &ledger.expenses, &period);
    tracing::debug!(
        period = %period.label,
        income = %summary.total_income,
        expenses = %summary.total_expenses,
        "monthly summary computed"
    );

    let cumulative = if sub.get_flag("cumulative") {
        let all = store.ledger_through(s, period.end)?;
        Some(compute_monthly_summary(
            &all.income,
            &all.expenses,
            &ReportingPeriod::through(period.end),
        ))
    } else {
        None
    };
    Ok(MonthReport {
        summary,
        cumulative,
    })
}

fn totals_rows(sum: &MonthlySummary, sym: &str) -> Vec<Vec<String>> {
    let share = |v| {
        percent_of(v, sum.total_income.saturating_add(sum.total_expenses))
            .map(|p| format!("{}%", p))
            .unwrap_or_else(|| "-".into())
    };
    vec![
        vec![
            "Income".into(),
            fmt_money(&sum.total_income, sym),
            sum.income_count.to_string(),
            share(sum.total_income),
        ],
        vec![
            "Expenses".into(),
            fmt_money(&sum.total_expenses, sym),
            sum.expense_count.to_string(),
            share(sum.total_expenses),
        ],
        vec![
            "Net balance".into(),
            fmt_money(&sum.net_balance, sym),
            String::new(),
            String::new(),
        ],
    ]
}

fn month(
    conn: &Connection,
    s: &Session,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<()> {
    let report = month_report(conn, s, sub, now)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let sym = config::currency_symbol(conn)?;
    let sum = &report.summary;
    println!("Monthly cash flow: {}", sum.period.label);
    println!(
        "{}",
        pretty_table(
            &["", "Total", "Records", "Share"],
            totals_rows(sum, &sym)
        )
    );
    if sum.is_empty() {
        println!("No records in this period");
    }
    println!();
    println!("Income vs. expenses");
    for line in render_bars(&sum.comparison, BAR_WIDTH) {
        println!("  {}", line);
    }
    println!();
    println!("Share of flow");
    for line in render_shares(&sum.proportion, BAR_WIDTH) {
        println!("  {}", line);
    }
    if let Some(c) = &report.cumulative {
        println!();
        println!("All-time balance ({})", c.period.label);
        println!(
            "{}",
            pretty_table(&["", "Total", "Records", "Share"], totals_rows(c, &sym))
        );
    }
    Ok(())
}

/// One summary per month for the last `months` months, newest first. Both
/// sides are fetched once for the whole window.
pub fn cashflow_rows(
    conn: &Connection,
    s: &Session,
    months: u32,
    now: DateTime<Utc>,
) -> Result<Vec<MonthlySummary>> {
    let periods = config::calendar(conn)?.months_back(now, months)?;
    let (Some(newest), Some(oldest)) = (periods.first(), periods.last()) else {
        return Ok(Vec::new());
    };
    let window = ReportingPeriod::new("window", oldest.start, newest.end)?;
    let ledger = SqliteLedgerStore::new(conn).ledger(s, &window)?;
    Ok(cash_flow(&ledger.income, &ledger.expenses, &periods))
}

fn cashflow(
    conn: &Connection,
    s: &Session,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<()> {
    let months = *sub.get_one::<u32>("months").unwrap_or(&6);
    let data = cashflow_rows(conn, s, months, now)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let sym = config::currency_symbol(conn)?;
        let rows = data
            .iter()
            .map(|m| {
                vec![
                    m.period.label.clone(),
                    fmt_money(&m.total_income, &sym),
                    fmt_money(&m.total_expenses, &sym),
                    fmt_money(&m.net_balance, &sym),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Month", "Income", "Expenses", "Net"], rows)
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct CategoryReport {
    pub period: ReportingPeriod,
    pub expenses: Vec<CategoryShare>,
    pub income: Vec<CategoryShare>,
}

pub fn category_report(
    conn: &Connection,
    s: &Session,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<CategoryReport> {
    let period = resolve_period(conn, sub, now)?;
    let ledger = SqliteLedgerStore::new(conn).ledger(s, &period)?;
    Ok(CategoryReport {
        expenses: breakdown(&ledger.expenses, &period),
        income: breakdown(&ledger.income, &period),
        period,
    })
}

fn share_rows(items: &[CategoryShare], sym: &str) -> Vec<Vec<String>> {
    items
        .iter()
        .map(|c| {
            vec![
                c.label.clone(),
                fmt_money(&c.total, sym),
                c.count.to_string(),
                c.percent
                    .map(|p| format!("{}%", p))
                    .unwrap_or_else(|| "-".into()),
            ]
        })
        .collect()
}

fn categories(
    conn: &Connection,
    s: &Session,
    sub: &clap::ArgMatches,
    now: DateTime<Utc>,
) -> Result<()> {
    let report = category_report(conn, s, sub, now)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    let sym = config::currency_symbol(conn)?;
    println!("Expenses by category: {}", report.period.label);
    println!(
        "{}",
        pretty_table(
            &["Category", "Spent", "Records", "Share"],
            share_rows(&report.expenses, &sym)
        )
    );
    println!("Income by source: {}", report.period.label);
    println!(
        "{}",
        pretty_table(
            &["Source", "Received", "Records", "Share"],
            share_rows(&report.income, &sym)
        )
    );
    Ok(())
}
