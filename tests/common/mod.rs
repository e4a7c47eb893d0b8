// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;
use rust_decimal::Decimal;
use spendlens::clock::FixedClock;
use spendlens::db;
use spendlens::models::{NewTransaction, Transaction};
use spendlens::store::SqliteStore;

pub fn at(y: i32, m: u32, d: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(hour, 0, 0)
        .unwrap()
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

pub fn new_tx(category: &str, amount: &str, date: NaiveDateTime) -> NewTransaction {
    NewTransaction {
        amount: dec(amount),
        category: category.into(),
        date,
        payment_method: None,
        note: None,
    }
}

pub fn tx(id: i64, category: &str, amount: &str, date: NaiveDateTime) -> Transaction {
    new_tx(category, amount, date).with_id(id)
}

pub fn store() -> Arc<SqliteStore> {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    Arc::new(SqliteStore::new(conn))
}

pub fn clock_at(y: i32, m: u32, d: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(at(y, m, d, 12)))
}
