// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::{optional_text, required};
use crate::analytics::filter_month;
use crate::clock::Clock;
use crate::error::StoreError;
use crate::models::{NewTransaction, Transaction};
use crate::store::SqliteStore;
use crate::utils::{
    fmt_money, maybe_print_json, parse_datetime, parse_decimal, parse_id, parse_month,
    pretty_table,
};
use anyhow::{Context, Result};

/// Shown in tables when a transaction has no payment method recorded.
pub const DEFAULT_PAYMENT_LABEL: &str = "Cash";

pub fn handle(store: &SqliteStore, clock: &dyn Clock, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            add(store, clock, sub)?;
        }
        Some(("list", sub)) => list(store, sub)?,
        Some(("show", sub)) => show(store, sub)?,
        Some(("edit", sub)) => {
            edit(store, sub)?;
        }
        Some(("rm", sub)) => remove(store, sub)?,
        _ => {}
    }
    Ok(())
}

pub fn add(store: &SqliteStore, clock: &dyn Clock, sub: &clap::ArgMatches) -> Result<Transaction> {
    let amount = parse_decimal(required(sub, "amount")?)?;
    let category = required(sub, "category")?.trim().to_string();
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_datetime(d)?,
        None => clock.now(),
    };
    let tx = store.insert(NewTransaction {
        amount,
        category,
        date,
        payment_method: optional_text(sub, "payment"),
        note: optional_text(sub, "note"),
    })?;
    println!(
        "Recorded {} for {} on {} (id {})",
        fmt_money(&tx.amount),
        tx.category,
        tx.date.format("%Y-%m-%d %H:%M"),
        tx.id
    );
    Ok(tx)
}

fn list(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(store, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data.iter().map(table_row).collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Category", "Amount", "Payment", "Note"],
                rows,
            )
        );
    }
    Ok(())
}

/// Transactions matching the `list` filters, newest first.
pub fn query_rows(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let mut data = match optional_text(sub, "category") {
        Some(cat) => store.get_by_category(&cat)?,
        None => store.all()?,
    };
    if let Some(month) = sub.get_one::<String>("month") {
        data = filter_month(&data, parse_month(month)?);
    }
    if let Some(limit) = sub.get_one::<usize>("limit") {
        data.truncate(*limit);
    }
    Ok(data)
}

fn table_row(t: &Transaction) -> Vec<String> {
    vec![
        t.id.to_string(),
        t.date.format("%Y-%m-%d %H:%M").to_string(),
        t.category.clone(),
        fmt_money(&t.amount),
        t.payment_method
            .clone()
            .unwrap_or_else(|| DEFAULT_PAYMENT_LABEL.to_string()),
        t.note.clone().unwrap_or_default(),
    ]
}

fn fetch(store: &SqliteStore, raw_id: &str) -> Result<Transaction> {
    let id = parse_id(raw_id)?;
    store
        .get_by_id(id)?
        .ok_or(StoreError::NotFound(id))
        .with_context(|| format!("Cannot load transaction {}", id))
}

fn show(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let tx = fetch(store, required(sub, "id")?)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
        println!(
            "{}",
            pretty_table(
                &["ID", "Date", "Category", "Amount", "Payment", "Note"],
                vec![table_row(&tx)],
            )
        );
    }
    Ok(())
}

pub fn edit(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<Transaction> {
    let mut tx = fetch(store, required(sub, "id")?)?;
    if let Some(amount) = sub.get_one::<String>("amount") {
        tx.amount = parse_decimal(amount)?;
    }
    if let Some(category) = sub.get_one::<String>("category") {
        tx.category = category.trim().to_string();
    }
    if let Some(date) = sub.get_one::<String>("date") {
        tx.date = parse_datetime(date)?;
    }
    if sub.get_flag("clear_payment") {
        tx.payment_method = None;
    } else if let Some(p) = optional_text(sub, "payment") {
        tx.payment_method = Some(p);
    }
    if sub.get_flag("clear_note") {
        tx.note = None;
    } else if let Some(n) = optional_text(sub, "note") {
        tx.note = Some(n);
    }
    store.update(&tx)?;
    println!("Updated transaction {}", tx.id);
    Ok(tx)
}

fn remove(store: &SqliteStore, sub: &clap::ArgMatches) -> Result<()> {
    let id = parse_id(required(sub, "id")?)?;
    store.delete(id)?;
    println!("Removed transaction {}", id);
    Ok(())
}
