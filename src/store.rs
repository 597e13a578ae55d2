// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Persistence boundary for income and expense records. Records are
//! append-only and always scoped to the session's user.

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, params};
use rust_decimal::Decimal;

use crate::aggregator::ReportingPeriod;
use crate::errors::{Error, Result};
use crate::models::{ExpenseRecord, IncomeRecord, Ledger, NewExpense, NewIncome, Session};

/// Filters for listing records. Results always come back newest first.
#[derive(Debug, Clone, Default)]
pub struct RecordQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    /// Exact source (income) or category (expenses).
    pub label: Option<String>,
    pub limit: Option<usize>,
}

impl RecordQuery {
    pub fn within(period: &ReportingPeriod) -> Self {
        Self {
            from: (period.start > DateTime::<Utc>::MIN_UTC).then_some(period.start),
            to: Some(period.end),
            ..Default::default()
        }
    }
}

pub trait LedgerStore {
    fn add_income(&self, session: &Session, new: NewIncome) -> Result<IncomeRecord>;
    fn add_expense(&self, session: &Session, new: NewExpense) -> Result<ExpenseRecord>;
    fn income(&self, session: &Session, query: &RecordQuery) -> Result<Vec<IncomeRecord>>;
    fn expenses(&self, session: &Session, query: &RecordQuery) -> Result<Vec<ExpenseRecord>>;

    /// Both sides of the ledger for `period`, read as one consistent pair.
    fn ledger(&self, session: &Session, period: &ReportingPeriod) -> Result<Ledger>;

    fn ledger_through(&self, session: &Session, end: DateTime<Utc>) -> Result<Ledger> {
        self.ledger(session, &ReportingPeriod::through(end))
    }
}

pub struct SqliteLedgerStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteLedgerStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

pub fn format_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Corrupt(format!("timestamp '{}': {}", s, e)))
}

fn parse_amount(s: &str) -> Result<Decimal> {
    s.parse::<Decimal>()
        .map_err(|e| Error::Corrupt(format!("amount '{}': {}", s, e)))
}

/// Which table a query targets and what its free-text label column is called.
struct Side {
    table: &'static str,
    label_col: &'static str,
}

const INCOME: Side = Side {
    table: "income",
    label_col: "source",
};
const EXPENSES: Side = Side {
    table: "expenses",
    label_col: "category",
};

struct RawRow {
    id: i64,
    user_id: String,
    label: String,
    amount: String,
    description: Option<String>,
    occurred_at: String,
}

fn insert(
    conn: &Connection,
    side: &Side,
    session: &Session,
    label: &str,
    amount: Decimal,
    description: Option<&str>,
    occurred_at: DateTime<Utc>,
) -> Result<i64> {
    let sql = format!(
        "INSERT INTO {}(user_id, {}, amount, description, occurred_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        side.table, side.label_col
    );
    conn.execute(
        &sql,
        params![
            session.user_id,
            label,
            amount.to_string(),
            description,
            format_ts(occurred_at)
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

fn select(
    conn: &Connection,
    side: &Side,
    session: &Session,
    query: &RecordQuery,
) -> Result<Vec<RawRow>> {
    let mut sql = format!(
        "SELECT id, user_id, {}, amount, description, occurred_at FROM {} WHERE user_id=?",
        side.label_col, side.table
    );
    let mut params_vec: Vec<String> = vec![session.user_id.clone()];

    if let Some(from) = query.from {
        sql.push_str(" AND occurred_at>=?");
        params_vec.push(format_ts(from));
    }
    if let Some(to) = query.to {
        sql.push_str(" AND occurred_at<=?");
        params_vec.push(format_ts(to));
    }
    if let Some(label) = &query.label {
        sql.push_str(&format!(" AND {}=?", side.label_col));
        params_vec.push(label.clone());
    }
    sql.push_str(" ORDER BY occurred_at DESC, id DESC");
    if let Some(limit) = query.limit {
        sql.push_str(" LIMIT ?");
        params_vec.push(limit.to_string());
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), |r| {
        Ok(RawRow {
            id: r.get(0)?,
            user_id: r.get(1)?,
            label: r.get(2)?,
            amount: r.get(3)?,
            description: r.get(4)?,
            occurred_at: r.get(5)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn into_income(r: RawRow) -> Result<IncomeRecord> {
    Ok(IncomeRecord {
        id: r.id,
        user_id: r.user_id,
        source: r.label,
        amount: parse_amount(&r.amount)?,
        description: r.description,
        occurred_at: parse_ts(&r.occurred_at)?,
    })
}

fn into_expense(r: RawRow) -> Result<ExpenseRecord> {
    Ok(ExpenseRecord {
        id: r.id,
        user_id: r.user_id,
        category: r.label,
        amount: parse_amount(&r.amount)?,
        description: r.description,
        occurred_at: parse_ts(&r.occurred_at)?,
    })
}

fn income_rows(conn: &Connection, session: &Session, q: &RecordQuery) -> Result<Vec<IncomeRecord>> {
    select(conn, &INCOME, session, q)?
        .into_iter()
        .map(into_income)
        .collect()
}

fn expense_rows(
    conn: &Connection,
    session: &Session,
    q: &RecordQuery,
) -> Result<Vec<ExpenseRecord>> {
    select(conn, &EXPENSES, session, q)?
        .into_iter()
        .map(into_expense)
        .collect()
}

impl LedgerStore for SqliteLedgerStore<'_> {
    fn add_income(&self, session: &Session, new: NewIncome) -> Result<IncomeRecord> {
        let new = new.validate()?;
        let id = insert(
            self.conn,
            &INCOME,
            session,
            &new.source,
            new.amount,
            new.description.as_deref(),
            new.occurred_at,
        )?;
        tracing::info!(id, user = %session.user_id, amount = %new.amount, "income recorded");
        Ok(IncomeRecord {
            id,
            user_id: session.user_id.clone(),
            source: new.source,
            amount: new.amount,
            description: new.description,
            occurred_at: new.occurred_at,
        })
    }

    fn add_expense(&self, session: &Session, new: NewExpense) -> Result<ExpenseRecord> {
        let new = new.validate()?;
        let id = insert(
            self.conn,
            &EXPENSES,
            session,
            &new.category,
            new.amount,
            new.description.as_deref(),
            new.occurred_at,
        )?;
        tracing::info!(id, user = %session.user_id, amount = %new.amount, "expense recorded");
        Ok(ExpenseRecord {
            id,
            user_id: session.user_id.clone(),
            category: new.category,
            amount: new.amount,
            description: new.description,
            occurred_at: new.occurred_at,
        })
    }

    fn income(&self, session: &Session, query: &RecordQuery) -> Result<Vec<IncomeRecord>> {
        income_rows(self.conn, session, query)
    }

    fn expenses(&self, session: &Session, query: &RecordQuery) -> Result<Vec<ExpenseRecord>> {
        expense_rows(self.conn, session, query)
    }

    fn ledger(&self, session: &Session, period: &ReportingPeriod) -> Result<Ledger> {
        let q = RecordQuery::within(period);
        let tx = self.conn.unchecked_transaction()?;
        let income = income_rows(&tx, session, &q)?;
        let expenses = expense_rows(&tx, session, &q)?;
        tx.commit()?;
        tracing::debug!(
            period = %period.label,
            income = income.len(),
            expenses = expenses.len(),
            "ledger fetched"
        );
        Ok(Ledger { income, expenses })
    }
}
