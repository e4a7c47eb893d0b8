// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use chrono::{NaiveDate, TimeDelta};
use common::{at, clock_at, dec, new_tx, store};
use rust_decimal::Decimal;
use spendlens::commands::reports::{DailyRow, daily_rows};
use spendlens::engine::AnalyticsEngine;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn daily_rows_label_current_month_window_up_to_today() {
    let store = store();
    store.insert(new_tx("Food", "8", at(2024, 3, 19, 9))).unwrap();
    let engine = AnalyticsEngine::new(store, clock_at(2024, 3, 20), TimeDelta::zero());

    let rows = daily_rows(&engine, day(2024, 3, 20), 3).unwrap();
    assert_eq!(
        rows,
        vec![
            DailyRow { date: day(2024, 3, 18), amount: Decimal::ZERO },
            DailyRow { date: day(2024, 3, 19), amount: dec("8") },
            DailyRow { date: day(2024, 3, 20), amount: Decimal::ZERO },
        ]
    );
}

#[test]
fn daily_rows_for_past_month_end_on_its_last_day() {
    let store = store();
    store.insert(new_tx("Bills", "70", at(2023, 12, 31, 20))).unwrap();
    let engine = AnalyticsEngine::new(store, clock_at(2024, 3, 20), TimeDelta::zero());
    engine.set_selected_month(2023, 12).unwrap();

    let rows = daily_rows(&engine, day(2024, 3, 20), 2).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, day(2023, 12, 30));
    assert_eq!(rows[1], DailyRow { date: day(2023, 12, 31), amount: dec("70") });
    assert!(daily_rows(&engine, day(2024, 3, 20), 0).unwrap().is_empty());
}

#[test]
fn daily_report_window_is_bounded_on_the_command_line() {
    let parse = |days: &str| {
        spendlens::cli::build_cli().try_get_matches_from(["spendlens", "report", "daily", "--days", days])
    };
    let ok = parse("366").unwrap();
    let daily = ok.subcommand_matches("report").unwrap().subcommand_matches("daily").unwrap();
    assert_eq!(daily.get_one::<usize>("days"), Some(&366));

    assert!(parse("367").is_err());
    assert!(parse("18446744073709551615").is_err());
    assert!(parse("week").is_err());
}
