// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRecord {
    pub id: i64,
    pub user_id: String,
    pub source: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecord {
    pub id: i64,
    pub user_id: String,
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Anything on the ledger that carries an amount and a point in time.
pub trait Entry {
    fn amount(&self) -> Decimal;
    fn occurred_at(&self) -> DateTime<Utc>;
    /// Source for income, category for expenses.
    fn label(&self) -> &str;
}

impl Entry for IncomeRecord {
    fn amount(&self) -> Decimal {
        self.amount
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn label(&self) -> &str {
        &self.source
    }
}

impl Entry for ExpenseRecord {
    fn amount(&self) -> Decimal {
        self.amount
    }
    fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }
    fn label(&self) -> &str {
        &self.category
    }
}

/// Income as submitted by the user, before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewIncome {
    pub source: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub category: String,
    pub amount: Decimal,
    pub description: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

/// Largest amount a single record may carry (10^15). Sums of many such
/// records stay far below `Decimal::MAX`.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Decimal places kept for an amount.
pub const AMOUNT_SCALE: u32 = 4;

/// Range and precision rules shared by the store and the command line.
pub fn check_amount(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::Validation(format!(
            "amount must not be negative (got {})",
            amount
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(Error::Validation(format!(
            "amount must not exceed {} (got {})",
            MAX_AMOUNT, amount
        )));
    }
    if amount.normalize().scale() > AMOUNT_SCALE {
        return Err(Error::Validation(format!(
            "amount has more than {} decimal places (got {})",
            AMOUNT_SCALE, amount
        )));
    }
    Ok(())
}

fn check_entry(kind: &str, label: &str, amount: Decimal) -> Result<()> {
    if label.trim().is_empty() {
        return Err(Error::Validation(format!("{} label must not be empty", kind)));
    }
    check_amount(amount).map_err(|e| match e {
        Error::Validation(msg) => Error::Validation(format!("{} {}", kind, msg)),
        other => other,
    })
}

fn tidy_description(d: Option<String>) -> Option<String> {
    d.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl NewIncome {
    /// Trims text fields and rejects blank sources or out-of-range amounts.
    pub fn validate(self) -> Result<Self> {
        check_entry("income", &self.source, self.amount)?;
        Ok(Self {
            source: self.source.trim().to_string(),
            description: tidy_description(self.description),
            ..self
        })
    }
}

impl NewExpense {
    /// Trims text fields and rejects blank categories or out-of-range amounts.
    pub fn validate(self) -> Result<Self> {
        check_entry("expense", &self.category, self.amount)?;
        Ok(Self {
            category: self.category.trim().to_string(),
            description: tidy_description(self.description),
            ..self
        })
    }
}

/// Both sides of one user's ledger, fetched together for a single period.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Ledger {
    pub income: Vec<IncomeRecord>,
    pub expenses: Vec<ExpenseRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: String,
    pub email: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
    pub created_at: String,
}

/// An authenticated identity. Passed explicitly to every ledger query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
}
