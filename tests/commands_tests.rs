// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use pocketbook::commands::{doctor, expenses, income, summary};
use pocketbook::models::{NewExpense, NewIncome, Session};
use pocketbook::session::{self, SignUp};
use pocketbook::store::{LedgerStore, SqliteLedgerStore};
use pocketbook::{cli, config, db};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn setup() -> (Connection, Session) {
    let conn = db::open_in_memory().unwrap();
    config::set_setting(&conn, config::TIMEZONE, "utc").unwrap();
    session::sign_up(
        &conn,
        SignUp {
            email: "ada@example.com".into(),
            password: "pw".into(),
            confirm: "pw".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let s = session::sign_in(&conn, "ada@example.com", "pw").unwrap();
    let store = SqliteLedgerStore::new(&conn);
    for (src, amt, at) in [
        ("Salary", "1000", "2024-03-05T00:00:00Z"),
        ("Gift", "40", "2024-03-09T13:00:00Z"),
        ("Salary", "900", "2024-02-05T00:00:00Z"),
    ] {
        store
            .add_income(
                &s,
                NewIncome {
                    source: src.into(),
                    amount: dec(amt),
                    description: None,
                    occurred_at: ts(at),
                },
            )
            .unwrap();
    }
    for (cat, amt, at) in [
        ("Rent", "300", "2024-03-10T00:00:00Z"),
        ("Food", "50", "2024-02-28T00:00:00Z"),
        ("Food", "25", "2024-03-09T11:00:00Z"),
    ] {
        store
            .add_expense(
                &s,
                NewExpense {
                    category: cat.into(),
                    amount: dec(amt),
                    description: None,
                    occurred_at: ts(at),
                },
            )
            .unwrap();
    }
    (conn, s)
}

fn sub_matches(args: &[&str]) -> clap::ArgMatches {
    let mut matches = cli::build_cli().get_matches_from(args);
    // Walk down to the innermost subcommand.
    while let Some((_, m)) = matches.remove_subcommand() {
        matches = m;
    }
    matches
}

#[test]
fn income_list_applies_recency_window() {
    let (conn, s) = setup();
    let m = sub_matches(&["pocketbook", "income", "list", "--within", "1d"]);
    let rows = income::query_rows(&conn, &s, &m, ts("2024-03-10T12:00:00Z")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].source, "Gift");
}

#[test]
fn expense_list_filters_by_category_and_month() {
    let (conn, s) = setup();
    let m = sub_matches(&[
        "pocketbook",
        "expense",
        "list",
        "--category",
        "Food",
        "--month",
        "2024-03",
    ]);
    let rows = expenses::query_rows(&conn, &s, &m, ts("2024-03-10T12:00:00Z")).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].amount, dec("25"));
}

#[test]
fn add_rejects_negative_amount_at_parse_time() {
    let (conn, _) = setup();
    let m = cli::build_cli().get_matches_from([
        "pocketbook",
        "expense",
        "add",
        "--category",
        "Food",
        "--amount",
        "-5",
    ]);
    if let Some(("expense", em)) = m.subcommand() {
        let err = expenses::handle(&conn, em).unwrap_err();
        assert!(err.to_string().contains("must not be negative"));
    } else {
        panic!("no expense subcommand");
    }
}

#[test]
fn add_rejects_oversized_amount_at_parse_time() {
    let (conn, s) = setup();
    let m = cli::build_cli().get_matches_from([
        "pocketbook",
        "income",
        "add",
        "--source",
        "Lottery",
        "--amount",
        "10000000000000000",
    ]);
    if let Some(("income", im)) = m.subcommand() {
        let err = income::handle(&conn, im).unwrap_err();
        assert!(err.to_string().contains("must not exceed"));
    } else {
        panic!("no income subcommand");
    }
    let lottery = sub_matches(&["pocketbook", "income", "list", "--source", "Lottery"]);
    assert!(income::query_rows(&conn, &s, &lottery, Utc::now()).unwrap().is_empty());
}

#[test]
fn cashflow_months_must_be_in_range() {
    for bad in ["0", "1201", "18446744073709551615", "-3"] {
        let res = cli::build_cli().try_get_matches_from([
            "pocketbook",
            "summary",
            "cashflow",
            "--months",
            bad,
        ]);
        assert!(res.is_err(), "--months {} should be rejected", bad);
    }
    let m = sub_matches(&["pocketbook", "summary", "cashflow", "--months", "1200"]);
    assert_eq!(m.get_one::<u32>("months"), Some(&1200));
}

#[test]
fn month_report_matches_example() {
    let (conn, s) = setup();
    let m = sub_matches(&[
        "pocketbook",
        "summary",
        "month",
        "--month",
        "2024-03",
        "--cumulative",
    ]);
    let report = summary::month_report(&conn, &s, &m, Utc::now()).unwrap();
    assert_eq!(report.summary.total_income, dec("1040"));
    assert_eq!(report.summary.total_expenses, dec("325"));
    assert_eq!(report.summary.net_balance, dec("715"));
    let all = report.cumulative.unwrap();
    assert_eq!(all.total_income, dec("1940"));
    assert_eq!(all.total_expenses, dec("375"));
}

#[test]
fn month_defaults_to_current_month() {
    let (conn, s) = setup();
    let m = sub_matches(&["pocketbook", "summary", "month"]);
    let report = summary::month_report(&conn, &s, &m, ts("2024-02-15T00:00:00Z")).unwrap();
    assert_eq!(report.summary.period.label, "2024-02");
    assert_eq!(report.summary.net_balance, dec("850"));
    assert!(report.cumulative.is_none());
}

#[test]
fn cashflow_lists_recent_months_newest_first() {
    let (conn, s) = setup();
    let rows = summary::cashflow_rows(&conn, &s, 3, ts("2024-03-20T00:00:00Z")).unwrap();
    let labels: Vec<_> = rows.iter().map(|r| r.period.label.as_str()).collect();
    assert_eq!(labels, ["2024-03", "2024-02", "2024-01"]);
    assert_eq!(rows[1].total_expenses, dec("50"));
    assert!(rows[2].is_empty());
}

#[test]
fn category_report_ranks_expenses() {
    let (conn, s) = setup();
    let m = sub_matches(&["pocketbook", "summary", "categories", "--month", "2024-03"]);
    let r = summary::category_report(&conn, &s, &m, Utc::now()).unwrap();
    assert_eq!(r.expenses[0].label, "Rent");
    assert_eq!(r.expenses[1].label, "Food");
    assert_eq!(r.income[0].label, "Salary");
}

#[test]
fn doctor_flags_bad_rows() {
    let (conn, s) = setup();
    assert!(doctor::issues(&conn).unwrap().is_empty());
    conn.execute(
        "INSERT INTO expenses(user_id, category, amount, occurred_at) VALUES (?1, ' ', '-3', 'yesterday')",
        params![s.user_id],
    )
    .unwrap();
    let kinds: Vec<String> = doctor::issues(&conn)
        .unwrap()
        .into_iter()
        .map(|r| r[0].clone())
        .collect();
    assert_eq!(
        kinds,
        ["negative_amount", "bad_timestamp", "blank_category"]
    );
}

#[test]
fn settings_validate_known_keys() {
    let (conn, _) = setup();
    assert!(config::set_setting(&conn, "timezone", "mars").is_err());
    assert!(config::set_setting(&conn, "base_currency", "EUR").is_err());
    config::set_setting(&conn, config::CURRENCY_SYMBOL, "€").unwrap();
    assert_eq!(config::currency_symbol(&conn).unwrap(), "€");
}

#[test]
fn ledger_commands_require_sign_in() {
    let (conn, _) = setup();
    session::sign_out(&conn).unwrap();
    let m = cli::build_cli().get_matches_from(["pocketbook", "income", "list"]);
    if let Some(("income", im)) = m.subcommand() {
        let err = income::handle(&conn, im).unwrap_err();
        assert!(err.to_string().contains("Not signed in"));
    } else {
        panic!("no income subcommand");
    }
}
