// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Failures raised by the record store. Cloneable so a single failed
/// snapshot can be fanned out to every derived view.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("invalid transaction: {0}")]
    InvalidRecord(String),
    #[error("transaction {0} not found")]
    NotFound(i64),
    #[error("corrupt transaction {id}: {detail}")]
    Corrupt { id: i64, detail: String },
    #[error("record feed has not produced a snapshot yet")]
    Unavailable,
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MonthError {
    #[error("month must be between 1 and 12, got {0}")]
    OutOfRange(u32),
    #[error("year {0} is not supported")]
    UnsupportedYear(i32),
    #[error("invalid month '{0}', expected YYYY-MM")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown setting '{0}'")]
    UnknownKey(String),
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}
