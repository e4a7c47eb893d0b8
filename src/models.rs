// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::MonthError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDateTime,
    pub payment_method: Option<String>,
    pub note: Option<String>,
}

/// A transaction that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransaction {
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDateTime,
    pub payment_method: Option<String>,
    pub note: Option<String>,
}

impl NewTransaction {
    pub fn with_id(self, id: i64) -> Transaction {
        Transaction {
            id,
            amount: self.amount,
            category: self.category,
            date: self.date,
            payment_method: self.payment_method,
            note: self.note,
        }
    }
}

/// Calendar month the analytics views are scoped to. `month` is 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, MonthError> {
        if !(1..=12).contains(&month) {
            return Err(MonthError::OutOfRange(month));
        }
        // Years chrono cannot represent would break month_end later on.
        if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
            return Err(MonthError::UnsupportedYear(year));
        }
        Ok(Self { year, month })
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn contains(&self, date: &NaiveDateTime) -> bool {
        date.year() == self.year && date.month() == self.month
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    pub fn last_day(&self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl std::str::FromStr for YearMonth {
    type Err = MonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (y, m) = trimmed
            .split_once('-')
            .ok_or_else(|| MonthError::Malformed(trimmed.to_string()))?;
        let year = y
            .parse::<i32>()
            .map_err(|_| MonthError::Malformed(trimmed.to_string()))?;
        let month = m
            .parse::<u32>()
            .map_err(|_| MonthError::Malformed(trimmed.to_string()))?;
        Self::new(year, month)
    }
}

/// ARGB colour used by chart legends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color(pub u32);

impl Color {
    pub const GRAY: Color = Color(0xFF88_8888);

    pub fn hex(&self) -> String {
        format!("#{:06X}", self.0 & 0x00FF_FFFF)
    }
}

impl Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySlice {
    pub name: String,
    pub percent: f64,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub largest: Option<Decimal>,
    pub top_category: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_handle_leap_years_and_december() {
        let feb = YearMonth::new(2024, 2).unwrap();
        assert_eq!(feb.last_day(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        let dec = YearMonth::new(2023, 12).unwrap();
        assert_eq!(dec.last_day(), NaiveDate::from_ymd_opt(2023, 12, 31).unwrap());
        assert_eq!(dec.first_day(), NaiveDate::from_ymd_opt(2023, 12, 1).unwrap());
    }

    #[test]
    fn month_rejects_out_of_range_values() {
        assert_eq!(YearMonth::new(2024, 0), Err(MonthError::OutOfRange(0)));
        assert_eq!(YearMonth::new(2024, 13), Err(MonthError::OutOfRange(13)));
        assert!("2024-3".parse::<YearMonth>().is_ok());
        assert!(matches!(
            "March".parse::<YearMonth>(),
            Err(MonthError::Malformed(_))
        ));
    }

    #[test]
    fn color_hex_drops_alpha() {
        assert_eq!(Color(0xFF4C_AF50).hex(), "#4CAF50");
        assert_eq!(Color::GRAY.hex(), "#888888");
    }
}
