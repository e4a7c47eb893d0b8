// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::models::{Transaction, YearMonth};

/// Keeps the records dated inside `month`, in input order.
pub fn filter_month(records: &[Transaction], month: YearMonth) -> Vec<Transaction> {
    records
        .iter()
        .filter(|t| month.contains(&t.date))
        .cloned()
        .collect()
}
