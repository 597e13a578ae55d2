// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use pocketbook::aggregator::{Calendar, ReportingPeriod, compute_monthly_summary};
use pocketbook::db;
use pocketbook::errors::Error;
use pocketbook::models::{MAX_AMOUNT, NewExpense, NewIncome, Session};
use pocketbook::session::{self, SignUp};
use pocketbook::store::{LedgerStore, RecordQuery, SqliteLedgerStore};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn ts(s: &str) -> DateTime<Utc> {
    s.parse().unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn user(conn: &Connection, email: &str) -> Session {
    session::sign_up(
        conn,
        SignUp {
            email: email.into(),
            password: "pw".into(),
            confirm: "pw".into(),
            ..Default::default()
        },
    )
    .unwrap();
    session::sign_in(conn, email, "pw").unwrap()
}

fn income(source: &str, amount: &str, at: &str) -> NewIncome {
    NewIncome {
        source: source.into(),
        amount: dec(amount),
        description: None,
        occurred_at: ts(at),
    }
}

fn expense(category: &str, amount: &str, at: &str) -> NewExpense {
    NewExpense {
        category: category.into(),
        amount: dec(amount),
        description: Some("  ".into()),
        occurred_at: ts(at),
    }
}

#[test]
fn records_round_trip_with_trimmed_fields() {
    let conn = db::open_in_memory().unwrap();
    let s = user(&conn, "a@example.com");
    let store = SqliteLedgerStore::new(&conn);

    let saved = store
        .add_expense(&s, expense("  Food ", "12.34", "2024-03-10T08:30:00.123456Z"))
        .unwrap();
    assert_eq!(saved.category, "Food");
    assert_eq!(saved.description, None);

    let all = store.expenses(&s, &RecordQuery::default()).unwrap();
    assert_eq!(all, vec![saved]);
}

#[test]
fn write_boundary_rejects_negative_amounts_and_blank_labels() {
    let conn = db::open_in_memory().unwrap();
    let s = user(&conn, "a@example.com");
    let store = SqliteLedgerStore::new(&conn);

    let err = store
        .add_income(&s, income("Salary", "-1", "2024-03-01T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    let err = store
        .add_expense(&s, expense("   ", "5", "2024-03-01T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(store.income(&s, &RecordQuery::default()).unwrap().is_empty());
}

#[test]
fn queries_never_mix_users() {
    let conn = db::open_in_memory().unwrap();
    let a = user(&conn, "a@example.com");
    let b = user(&conn, "b@example.com");
    let store = SqliteLedgerStore::new(&conn);
    store
        .add_income(&a, income("Salary", "1000", "2024-03-05T00:00:00Z"))
        .unwrap();
    store
        .add_income(&b, income("Salary", "7", "2024-03-05T00:00:00Z"))
        .unwrap();

    let ledger = store
        .ledger(&a, &Calendar::Utc.month(2024, 3).unwrap())
        .unwrap();
    assert_eq!(ledger.income.len(), 1);
    assert!(ledger.income.iter().all(|r| r.user_id == a.user_id));
}

#[test]
fn ledger_pair_matches_period_inclusively() {
    let conn = db::open_in_memory().unwrap();
    let s = user(&conn, "a@example.com");
    let store = SqliteLedgerStore::new(&conn);
    store
        .add_income(&s, income("Salary", "1000", "2024-03-05T00:00:00Z"))
        .unwrap();
    store
        .add_expense(&s, expense("Rent", "300", "2024-03-10T00:00:00Z"))
        .unwrap();
    store
        .add_expense(&s, expense("Food", "50", "2024-02-28T00:00:00Z"))
        .unwrap();
    store
        .add_expense(&s, expense("Edge", "1", "2024-03-31T23:59:59.999999Z"))
        .unwrap();
    store
        .add_expense(&s, expense("Next", "9", "2024-04-01T00:00:00Z"))
        .unwrap();

    let march = Calendar::Utc.month(2024, 3).unwrap();
    let ledger = store.ledger(&s, &march).unwrap();
    let sum = compute_monthly_summary(&ledger.income, &ledger.expenses, &march);
    assert_eq!(sum.total_income, dec("1000"));
    assert_eq!(sum.total_expenses, dec("301"));
    assert_eq!(sum.net_balance, dec("699"));

    let through = store.ledger_through(&s, march.end).unwrap();
    assert_eq!(through.expenses.len(), 3);
    let all = compute_monthly_summary(
        &through.income,
        &through.expenses,
        &ReportingPeriod::through(march.end),
    );
    assert_eq!(all.total_expenses, dec("351"));
}

#[test]
fn listing_is_newest_first_with_label_and_limit() {
    let conn = db::open_in_memory().unwrap();
    let s = user(&conn, "a@example.com");
    let store = SqliteLedgerStore::new(&conn);
    for (i, day) in ["01", "03", "02"].iter().enumerate() {
        store
            .add_expense(
                &s,
                expense(
                    if i == 1 { "Fun" } else { "Food" },
                    "1",
                    &format!("2024-03-{}T00:00:00Z", day),
                ),
            )
            .unwrap();
    }
    let q = RecordQuery {
        label: Some("Food".into()),
        limit: Some(1),
        ..Default::default()
    };
    let rows = store.expenses(&s, &q).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].occurred_at, ts("2024-03-02T00:00:00Z"));
}

#[test]
fn write_boundary_caps_amount_size_and_precision() {
    let conn = db::open_in_memory().unwrap();
    let s = user(&conn, "a@example.com");
    let store = SqliteLedgerStore::new(&conn);

    let too_big = (MAX_AMOUNT + Decimal::ONE).to_string();
    let err = store
        .add_income(&s, income("Salary", &too_big, "2024-03-01T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("must not exceed")));
    let err = store
        .add_expense(&s, expense("Food", "1.00001", "2024-03-01T00:00:00Z"))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ref m) if m.contains("decimal places")));

    store
        .add_income(&s, income("Salary", &MAX_AMOUNT.to_string(), "2024-03-01T00:00:00Z"))
        .unwrap();
    store
        .add_expense(&s, expense("Food", "1.2500000", "2024-03-01T00:00:00Z"))
        .unwrap();
    let march = Calendar::Utc.month(2024, 3).unwrap();
    let ledger = store.ledger(&s, &march).unwrap();
    assert_eq!(ledger.income.len(), 1);
    assert_eq!(ledger.expenses.len(), 1);
}
