// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Pure computations over a user's ledger: period totals, chart series,
//! category breakdowns and recency windows. Nothing here performs I/O.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, Duration, LocalResult, Months, NaiveDate, NaiveDateTime, TimeZone, Utc,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::{Error, Result};
use crate::models::{Entry, ExpenseRecord, IncomeRecord};

/// Floor applied to each side of the proportion chart (0.1). A zero-valued
/// slice breaks pie rendering, so neither side is ever plotted as zero.
pub const CHART_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 1);

pub const INCOME_LABEL: &str = "Income";
pub const EXPENSES_LABEL: &str = "Expenses";

/// Longest run of months [`Calendar::months_back`] will lay out (100 years).
pub const MAX_MONTHS_BACK: u32 = 1200;

/// Closed interval `[start, end]` of absolute instants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportingPeriod {
    pub label: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportingPeriod {
    pub fn new(label: impl Into<String>, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start > end {
            return Err(Error::Validation(format!(
                "period start {} is after end {}",
                start, end
            )));
        }
        Ok(Self {
            label: label.into(),
            start,
            end,
        })
    }

    /// Everything up to and including `end`.
    pub fn through(end: DateTime<Utc>) -> Self {
        Self {
            label: format!("through {}", end.format("%Y-%m-%d")),
            start: DateTime::<Utc>::MIN_UTC,
            end,
        }
    }

    /// Calendar month `year-month` in `tz`: first day 00:00 up to the last
    /// microsecond before the next month starts.
    pub fn month_in<Tz: TimeZone>(tz: &Tz, year: i32, month: u32) -> Result<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| Error::Validation(format!("invalid month {}-{:02}", year, month)))?;
        let next = first
            .checked_add_months(Months::new(1))
            .ok_or_else(|| Error::Validation(format!("month {}-{:02} out of range", year, month)))?;
        let start = start_of_day_in(tz, first)?;
        let end = start_of_day_in(tz, next)? - Duration::microseconds(1);
        Self::new(format!("{}-{:02}", year, month), start, end)
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// Midnight of `date` in `tz`, as a UTC instant. Ambiguous midnights take the
/// earlier instant; midnights skipped by a DST jump move to 01:00.
pub fn start_of_day_in<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> Result<DateTime<Utc>> {
    let midnight: NaiveDateTime = date.and_time(chrono::NaiveTime::MIN);
    let local = match tz.from_local_datetime(&midnight) {
        LocalResult::Single(t) => t,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => tz
            .from_local_datetime(&(midnight + Duration::hours(1)))
            .earliest()
            .ok_or_else(|| Error::Validation(format!("no local midnight on {}", date)))?,
    };
    Ok(local.with_timezone(&Utc))
}

/// Timezone used to lay out calendar months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Calendar {
    #[default]
    Local,
    Utc,
}

impl FromStr for Calendar {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Calendar::Local),
            "utc" => Ok(Calendar::Utc),
            other => Err(Error::Validation(format!(
                "unknown timezone '{}', expected local|utc",
                other
            ))),
        }
    }
}

impl Calendar {
    pub fn as_str(&self) -> &'static str {
        match self {
            Calendar::Local => "local",
            Calendar::Utc => "utc",
        }
    }

    pub fn month(&self, year: i32, month: u32) -> Result<ReportingPeriod> {
        match self {
            Calendar::Local => ReportingPeriod::month_in(&chrono::Local, year, month),
            Calendar::Utc => ReportingPeriod::month_in(&Utc, year, month),
        }
    }

    pub fn start_of_day(&self, date: NaiveDate) -> Result<DateTime<Utc>> {
        match self {
            Calendar::Local => start_of_day_in(&chrono::Local, date),
            Calendar::Utc => start_of_day_in(&Utc, date),
        }
    }

    fn local_date(&self, at: DateTime<Utc>) -> NaiveDate {
        match self {
            Calendar::Local => at.with_timezone(&chrono::Local).date_naive(),
            Calendar::Utc => at.date_naive(),
        }
    }

    /// The calendar month containing `at`.
    pub fn month_of(&self, at: DateTime<Utc>) -> Result<ReportingPeriod> {
        let d = self.local_date(at);
        self.month(d.year(), d.month())
    }

    /// `count` consecutive months ending with the one containing `at`,
    /// newest first. `count` is capped at [`MAX_MONTHS_BACK`].
    pub fn months_back(&self, at: DateTime<Utc>, count: u32) -> Result<Vec<ReportingPeriod>> {
        if count > MAX_MONTHS_BACK {
            return Err(Error::Validation(format!(
                "at most {} months can be listed (got {})",
                MAX_MONTHS_BACK, count
            )));
        }
        let d = self.local_date(at);
        let first = NaiveDate::from_ymd_opt(d.year(), d.month(), 1)
            .ok_or_else(|| Error::Validation(format!("invalid date {}", d)))?;
        let mut out = Vec::with_capacity(count as usize);
        for back in 0..count {
            let m = first
                .checked_sub_months(Months::new(back))
                .ok_or_else(|| Error::Validation("month out of range".into()))?;
            out.push(self.month(m.year(), m.month())?);
        }
        Ok(out)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Decimal,
}

impl ChartPoint {
    fn new(label: &str, value: Decimal) -> Self {
        Self {
            label: label.to_string(),
            value,
        }
    }
}

/// Derived totals for one period. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlySummary {
    pub period: ReportingPeriod,
    pub total_income: Decimal,
    pub total_expenses: Decimal,
    pub net_balance: Decimal,
    pub income_count: usize,
    pub expense_count: usize,
    /// Income vs. expenses for proportion (pie) display.
    pub proportion: Vec<ChartPoint>,
    /// Income vs. expenses for magnitude (bar) display.
    pub comparison: Vec<ChartPoint>,
}

impl MonthlySummary {
    pub fn is_empty(&self) -> bool {
        self.income_count == 0 && self.expense_count == 0
    }
}

/// Sums saturate at the `Decimal` bounds instead of overflowing. Stored
/// amounts are capped well below that, so the clamp only matters for
/// records built outside the store.
fn total_within<E: Entry>(records: &[E], period: &ReportingPeriod) -> (Decimal, usize) {
    records
        .iter()
        .filter(|r| period.contains(r.occurred_at()))
        .fold((Decimal::ZERO, 0), |(sum, n), r| {
            (sum.saturating_add(r.amount()), n + 1)
        })
}

/// Totals, net balance and chart series for `period`.
///
/// Records are expected to belong to a single user and carry non-negative
/// amounts; both are enforced where records are written.
pub fn compute_monthly_summary(
    income: &[IncomeRecord],
    expenses: &[ExpenseRecord],
    period: &ReportingPeriod,
) -> MonthlySummary {
    let (total_income, income_count) = total_within(income, period);
    let (total_expenses, expense_count) = total_within(expenses, period);

    let floored_income = total_income.max(CHART_EPSILON);
    let floored_expenses = total_expenses.max(CHART_EPSILON);

    MonthlySummary {
        period: period.clone(),
        total_income,
        total_expenses,
        net_balance: total_income.saturating_sub(total_expenses),
        income_count,
        expense_count,
        proportion: vec![
            ChartPoint::new(INCOME_LABEL, floored_income),
            ChartPoint::new(EXPENSES_LABEL, floored_expenses),
        ],
        comparison: vec![
            ChartPoint::new(INCOME_LABEL, floored_income),
            ChartPoint::new(EXPENSES_LABEL, floored_expenses),
        ],
    }
}

/// One summary per period, in the order given.
pub fn cash_flow(
    income: &[IncomeRecord],
    expenses: &[ExpenseRecord],
    periods: &[ReportingPeriod],
) -> Vec<MonthlySummary> {
    periods
        .iter()
        .map(|p| compute_monthly_summary(income, expenses, p))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecencyWindow {
    #[default]
    All,
    Day,
    Week,
}

impl FromStr for RecencyWindow {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(RecencyWindow::All),
            "1d" | "1day" | "day" | "24h" => Ok(RecencyWindow::Day),
            "7d" | "7days" | "week" => Ok(RecencyWindow::Week),
            other => Err(Error::Validation(format!(
                "unknown window '{}', expected all|1d|7d",
                other
            ))),
        }
    }
}

impl RecencyWindow {
    pub fn span(&self) -> Option<Duration> {
        match self {
            RecencyWindow::All => None,
            RecencyWindow::Day => Some(Duration::hours(24)),
            RecencyWindow::Week => Some(Duration::days(7)),
        }
    }
}

/// Keeps records that happened strictly less than `window` before `now`.
/// Elapsed time, not calendar days: "1d" is the last 24 hours. Records dated
/// after `now` have not happened yet and fall outside every bounded window.
/// Order is preserved; sort separately with [`sort_newest_first`].
pub fn filter_by_recency<E: Entry>(
    records: Vec<E>,
    window: RecencyWindow,
    now: DateTime<Utc>,
) -> Vec<E> {
    match window.span() {
        None => records,
        Some(span) => records
            .into_iter()
            .filter(|r| {
                let age = now.signed_duration_since(r.occurred_at());
                age >= Duration::zero() && age < span
            })
            .collect(),
    }
}

/// Stable sort by timestamp, newest first.
pub fn sort_newest_first<E: Entry>(records: &mut [E]) {
    records.sort_by(|a, b| b.occurred_at().cmp(&a.occurred_at()));
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryShare {
    pub label: String,
    pub total: Decimal,
    pub count: usize,
    /// Share of the period total in percent, `None` when that total is zero.
    pub percent: Option<Decimal>,
}

/// `part / whole` as a percentage rounded to two places; `None` for a zero
/// whole or a ratio too large to represent.
pub fn percent_of(part: Decimal, whole: Decimal) -> Option<Decimal> {
    if whole.is_zero() {
        return None;
    }
    part.checked_div(whole)?
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|p| p.round_dp(2))
}

/// Per-label totals within `period`, largest first (ties by label).
pub fn breakdown<E: Entry>(records: &[E], period: &ReportingPeriod) -> Vec<CategoryShare> {
    let mut agg: HashMap<&str, (Decimal, usize)> = HashMap::new();
    let mut grand = Decimal::ZERO;
    for r in records.iter().filter(|r| period.contains(r.occurred_at())) {
        let e = agg.entry(r.label()).or_insert((Decimal::ZERO, 0));
        e.0 = e.0.saturating_add(r.amount());
        e.1 += 1;
        grand = grand.saturating_add(r.amount());
    }
    let mut items: Vec<CategoryShare> = agg
        .into_iter()
        .map(|(label, (total, count))| CategoryShare {
            label: label.to_string(),
            total,
            count,
            percent: percent_of(total, grand),
        })
        .collect();
    items.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.label.cmp(&b.label)));
    items
}
