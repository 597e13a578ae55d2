// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::aggregator::{Calendar, ChartPoint, compute_monthly_summary};
use pocketbook::utils::{render_bars, render_shares};

fn point(label: &str, value: &str) -> ChartPoint {
    ChartPoint {
        label: label.into(),
        value: value.parse().unwrap(),
    }
}

#[test]
fn bars_scale_to_largest_value() {
    let lines = render_bars(&[point("Income", "10"), point("Expenses", "5")], 10);
    assert_eq!(lines[0], "Income   | ########## 10.00");
    assert_eq!(lines[1], "Expenses | ##### 5.00");
}

#[test]
fn bars_survive_huge_values() {
    let lines = render_bars(&[point("Income", "10000000000000000000000000000")], 40);
    assert!(lines[0].contains(&"#".repeat(40)));
    let lines = render_bars(&[point("A", "0"), point("B", "0")], 40);
    assert_eq!(lines[0], "A |  0.00");
}

#[test]
fn shares_show_percent_of_series() {
    let lines = render_shares(&[point("Income", "30"), point("Expenses", "10")], 8);
    assert_eq!(lines[0], "Income   | ###### 75.00%");
    assert_eq!(lines[1], "Expenses | ## 25.00%");
}

#[test]
fn shares_of_empty_month_split_evenly() {
    let march = Calendar::Utc.month(2024, 3).unwrap();
    let s = compute_monthly_summary(&[], &[], &march);
    let lines = render_shares(&s.proportion, 10);
    assert_eq!(lines[0], "Income   | ##### 50.00%");
    assert_eq!(lines[1], "Expenses | ##### 50.00%");
    assert!(render_shares(&[], 10).is_empty());
}
