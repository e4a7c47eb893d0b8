// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use crate::models::{CategorySlice, Color, Transaction};

/// Label of the placeholder slice returned when there is nothing to chart.
pub const NO_DATA: &str = "No Data";

/// Fixed legend colours for the default categories. Anything else shares
/// `Color::GRAY`, so two custom categories cannot be told apart by colour.
pub fn category_color(category: &str) -> Color {
    match category {
        "Shopping" => Color(0xFF4C_AF50),
        "Food" => Color(0xFFFF_9800),
        "Transport" => Color(0xFF21_96F3),
        "Entertainment" => Color(0xFFF4_4336),
        "Bills" => Color(0xFF9C_27B0),
        _ => Color::GRAY,
    }
}

/// Share of spend per category, largest first.
///
/// Grouping uses the exact category string. When the amounts do not add up
/// to something positive the result is the single [`NO_DATA`] slice at 100%.
/// Equal shares keep the order in which their categories first appear.
pub fn category_slices(records: &[Transaction]) -> Vec<CategorySlice> {
    let total: Decimal = records.iter().map(|t| t.amount).sum();
    if total <= Decimal::ZERO {
        return vec![CategorySlice {
            name: NO_DATA.to_string(),
            percent: 1.0,
            color: Color::GRAY,
        }];
    }

    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(&str, Decimal)> = Vec::new();
    for t in records {
        match index.get(t.category.as_str()) {
            Some(&i) => groups[i].1 += t.amount,
            None => {
                index.insert(t.category.as_str(), groups.len());
                groups.push((t.category.as_str(), t.amount));
            }
        }
    }

    let mut slices: Vec<CategorySlice> = groups
        .into_iter()
        .map(|(name, sum)| CategorySlice {
            name: name.to_string(),
            percent: (sum / total).to_f64().unwrap_or_default(),
            color: category_color(name),
        })
        .collect();
    slices.sort_by(|a, b| b.percent.total_cmp(&a.percent));
    slices
}
