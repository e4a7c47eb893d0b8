// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::analytics::filter_month;
use crate::store::{DATE_FORMAT, SqliteStore};
use crate::utils::parse_month;
use anyhow::{Result, bail};
use serde_json::json;

pub fn handle(store: &SqliteStore, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => export_transactions(store, sub),
        _ => Ok(()),
    }
}

fn export_transactions(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = required(sub, "format")?.trim().to_lowercase();
    let out = required(sub, "out")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    // Oldest first reads naturally in a spreadsheet.
    let mut rows = store.all()?;
    rows.reverse();
    if let Some(month) = sub.get_one::<String>("month") {
        rows = filter_month(&rows, parse_month(month)?);
    }

    if fmt == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(["id", "date", "category", "amount", "payment_method", "note"])?;
        for t in &rows {
            wtr.write_record([
                t.id.to_string(),
                t.date.format(DATE_FORMAT).to_string(),
                t.category.clone(),
                t.amount.to_string(),
                t.payment_method.clone().unwrap_or_default(),
                t.note.clone().unwrap_or_default(),
            ])?;
        }
        wtr.flush()?;
    } else {
        let items: Vec<_> = rows
            .iter()
            .map(|t| {
                json!({
                    "id": t.id,
                    "date": t.date.format(DATE_FORMAT).to_string(),
                    "category": t.category,
                    "amount": t.amount.to_string(),
                    "payment_method": t.payment_method,
                    "note": t.note,
                })
            })
            .collect();
        std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
    }
    println!("Exported {} transactions to {}", rows.len(), out);
    Ok(())
}
