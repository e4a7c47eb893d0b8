// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::str::FromStr;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::NaiveDateTime;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

use crate::error::StoreError;
use crate::models::{NewTransaction, Transaction};
use crate::reactive::{Callback, Hub, Subscription};

/// Full listing of transactions at one point in time.
pub type RecordSnapshot = Result<Arc<Vec<Transaction>>, StoreError>;

pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Largest single amount accepted at creation.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

/// Live source of transaction snapshots.
pub trait RecordStore: Send + Sync {
    /// Delivers the current snapshot right away and a fresh one after every
    /// change to the underlying data.
    fn stream_all(&self, on_snapshot: Callback<RecordSnapshot>) -> Subscription;
}

const SELECT_COLUMNS: &str = "SELECT id, amount, category, date, payment_method, note FROM transactions";

/// SQLite-backed transaction store.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    feed: Hub<RecordSnapshot>,
}

impl SqliteStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            feed: Hub::new(),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn insert(&self, tx: NewTransaction) -> Result<Transaction, StoreError> {
        validate(&tx.amount, &tx.category)?;
        let id = {
            let conn = self.conn();
            conn.execute(
                "INSERT INTO transactions(amount, category, date, payment_method, note)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    tx.amount.to_string(),
                    tx.category,
                    tx.date.format(DATE_FORMAT).to_string(),
                    tx.payment_method,
                    tx.note
                ],
            )?;
            conn.last_insert_rowid()
        };
        tracing::info!(id, category = %tx.category, amount = %tx.amount, "transaction recorded");
        self.republish();
        Ok(tx.with_id(id))
    }

    pub fn update(&self, tx: &Transaction) -> Result<(), StoreError> {
        validate(&tx.amount, &tx.category)?;
        let changed = self.conn().execute(
            "UPDATE transactions SET amount=?1, category=?2, date=?3, payment_method=?4, note=?5
             WHERE id=?6",
            params![
                tx.amount.to_string(),
                tx.category,
                tx.date.format(DATE_FORMAT).to_string(),
                tx.payment_method,
                tx.note,
                tx.id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(tx.id));
        }
        tracing::info!(id = tx.id, "transaction updated");
        self.republish();
        Ok(())
    }

    pub fn delete(&self, id: i64) -> Result<(), StoreError> {
        let changed = self
            .conn()
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        tracing::info!(id, "transaction deleted");
        self.republish();
        Ok(())
    }

    pub fn get_by_id(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let conn = self.conn();
        let raw = conn
            .query_row(
                &format!("{SELECT_COLUMNS} WHERE id=?1"),
                params![id],
                RawRow::from_row,
            )
            .optional()?;
        raw.map(RawRow::parse).transpose()
    }

    pub fn get_by_category(&self, category: &str) -> Result<Vec<Transaction>, StoreError> {
        self.query(
            &format!("{SELECT_COLUMNS} WHERE category=?1 ORDER BY date DESC, id DESC"),
            params![category],
        )
    }

    /// Every transaction, newest first.
    pub fn all(&self) -> Result<Vec<Transaction>, StoreError> {
        self.query(&format!("{SELECT_COLUMNS} ORDER BY date DESC, id DESC"), [])
    }

    fn query(&self, sql: &str, args: impl rusqlite::Params) -> Result<Vec<Transaction>, StoreError> {
        let conn = self.conn();
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(args, RawRow::from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?.parse()?);
        }
        Ok(out)
    }

    fn snapshot(&self) -> RecordSnapshot {
        self.all().map(Arc::new)
    }

    fn republish(&self) {
        let snapshot = self.snapshot();
        if let Err(err) = &snapshot {
            tracing::warn!(error = %err, "failed to reload transactions");
        }
        self.feed.publish(snapshot);
    }
}

impl RecordStore for SqliteStore {
    fn stream_all(&self, on_snapshot: Callback<RecordSnapshot>) -> Subscription {
        self.feed
            .subscribe_with_replay(on_snapshot, || Some(self.snapshot()))
    }
}

fn validate(amount: &Decimal, category: &str) -> Result<(), StoreError> {
    if *amount <= Decimal::ZERO {
        return Err(StoreError::InvalidRecord(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }
    if *amount > MAX_AMOUNT {
        return Err(StoreError::InvalidRecord(format!(
            "amount {} exceeds the maximum of {}",
            amount, MAX_AMOUNT
        )));
    }
    if category.trim().is_empty() {
        return Err(StoreError::InvalidRecord("category must not be empty".into()));
    }
    Ok(())
}

struct RawRow {
    id: i64,
    amount: String,
    category: String,
    date: String,
    payment_method: Option<String>,
    note: Option<String>,
}

impl RawRow {
    fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            amount: r.get(1)?,
            category: r.get(2)?,
            date: r.get(3)?,
            payment_method: r.get(4)?,
            note: r.get(5)?,
        })
    }

    fn parse(self) -> Result<Transaction, StoreError> {
        let amount = Decimal::from_str(&self.amount).map_err(|e| StoreError::Corrupt {
            id: self.id,
            detail: format!("amount '{}': {}", self.amount, e),
        })?;
        let date = NaiveDateTime::parse_from_str(&self.date, DATE_FORMAT).map_err(|e| {
            StoreError::Corrupt {
                id: self.id,
                detail: format!("date '{}': {}", self.date, e),
            }
        })?;
        Ok(Transaction {
            id: self.id,
            amount,
            category: self.category,
            date,
            payment_method: self.payment_method,
            note: self.note,
        })
    }
}
