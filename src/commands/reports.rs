// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::analytics::window_anchor;
use crate::config::Config;
use crate::engine::AnalyticsEngine;
use crate::utils::{fmt_money, fmt_percent, maybe_print_json, parse_month, pretty_table};
use anyhow::Result;
use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(
    engine: &AnalyticsEngine,
    config: &Config,
    today: NaiveDate,
    m: &clap::ArgMatches,
) -> Result<()> {
    match m.subcommand() {
        Some(("categories", sub)) => categories(engine, sub)?,
        Some(("daily", sub)) => daily(engine, config, today, sub)?,
        Some(("summary", sub)) => summary(engine, sub)?,
        _ => {}
    }
    Ok(())
}

fn select_month(engine: &AnalyticsEngine, sub: &clap::ArgMatches) -> Result<()> {
    if let Some(raw) = sub.get_one::<String>("month") {
        let month = parse_month(raw)?;
        engine.set_selected_month(month.year(), month.month())?;
    }
    Ok(())
}

fn categories(engine: &AnalyticsEngine, sub: &clap::ArgMatches) -> Result<()> {
    select_month(engine, sub)?;
    let slices = engine.category_slices()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &slices)? {
        let rows = slices
            .iter()
            .map(|s| vec![s.name.clone(), fmt_percent(s.percent), s.color.hex()])
            .collect();
        println!(
            "Spending by category for {}",
            engine.selected_month()
        );
        println!("{}", pretty_table(&["Category", "Share", "Color"], rows));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRow {
    pub date: NaiveDate,
    pub amount: Decimal,
}

/// Pairs each series entry with its calendar day, oldest first.
pub fn daily_rows(engine: &AnalyticsEngine, today: NaiveDate, days: usize) -> Result<Vec<DailyRow>> {
    let series = engine.daily_series(days)?;
    let anchor = window_anchor(engine.selected_month(), today);
    let len = series.len() as u64;
    Ok(series
        .into_iter()
        .enumerate()
        .filter_map(|(i, amount)| {
            let back = len - 1 - i as u64;
            anchor
                .checked_sub_days(Days::new(back))
                .map(|date| DailyRow { date, amount })
        })
        .collect())
}

fn daily(
    engine: &AnalyticsEngine,
    config: &Config,
    today: NaiveDate,
    sub: &clap::ArgMatches,
) -> Result<()> {
    select_month(engine, sub)?;
    let days = sub
        .get_one::<usize>("days")
        .copied()
        .unwrap_or(config.daily_window_days);
    let data = daily_rows(engine, today, days)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = data
            .iter()
            .map(|r| vec![r.date.format("%a %Y-%m-%d").to_string(), fmt_money(&r.amount)])
            .collect();
        println!("{}", pretty_table(&["Day", "Spent"], rows));
    }
    Ok(())
}

fn summary(engine: &AnalyticsEngine, sub: &clap::ArgMatches) -> Result<()> {
    select_month(engine, sub)?;
    let s = engine.summary()?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        let rows = vec![
            vec!["Month".to_string(), engine.selected_month().to_string()],
            vec!["Total spent".to_string(), fmt_money(&s.total)],
            vec!["Transactions".to_string(), s.count.to_string()],
            vec!["Average".to_string(), fmt_money(&s.average)],
            vec![
                "Largest".to_string(),
                s.largest.as_ref().map(fmt_money).unwrap_or_else(|| "-".into()),
            ],
            vec![
                "Top category".to_string(),
                s.top_category.clone().unwrap_or_else(|| "-".into()),
            ],
        ];
        println!("{}", pretty_table(&["", ""], rows));
    }
    Ok(())
}
