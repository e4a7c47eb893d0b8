// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Transaction, YearMonth};

pub const DEFAULT_WINDOW_DAYS: usize = 7;

/// Longest window any caller may ask for; a year of days.
pub const MAX_WINDOW_DAYS: usize = 366;

/// Last day of the trailing window: `today` while `month` is the current
/// month, otherwise the final day of `month`.
pub fn window_anchor(month: YearMonth, today: NaiveDate) -> NaiveDate {
    if YearMonth::of(today) == month {
        today
    } else {
        month.last_day()
    }
}

/// Per-day spend for the `days` days ending at the window anchor, oldest
/// first. Days are matched on (year, day-of-year), so time of day never
/// matters. Records outside the window are ignored.
pub fn daily_series(
    records: &[Transaction],
    month: YearMonth,
    today: NaiveDate,
    days: usize,
) -> Vec<Decimal> {
    let anchor = window_anchor(month, today);
    (0..days)
        .rev()
        .map(|back| {
            let Some(day) = anchor.checked_sub_days(Days::new(back as u64)) else {
                return Decimal::ZERO;
            };
            records
                .iter()
                .filter(|t| t.date.year() == day.year() && t.date.ordinal() == day.ordinal())
                .map(|t| t.amount)
                .sum()
        })
        .collect()
}
