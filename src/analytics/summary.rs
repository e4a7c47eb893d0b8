// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;

use super::categories::category_slices;
use crate::models::{MonthlySummary, Transaction};

pub fn monthly_summary(records: &[Transaction]) -> MonthlySummary {
    let total: Decimal = records.iter().map(|t| t.amount).sum();
    let count = records.len();
    let average = if count == 0 {
        Decimal::ZERO
    } else {
        (total / Decimal::from(count)).round_dp(2)
    };
    let largest = records.iter().map(|t| t.amount).max();
    let top_category = if total > Decimal::ZERO {
        category_slices(records).into_iter().next().map(|s| s.name)
    } else {
        None
    };
    MonthlySummary {
        total,
        count,
        average,
        largest,
        top_category,
    }
}
