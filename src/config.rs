// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::TimeDelta;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;

use crate::analytics::{DEFAULT_WINDOW_DAYS, MAX_WINDOW_DAYS};
use crate::error::ConfigError;

pub const KEY_WINDOW_DAYS: &str = "daily_window_days";
pub const KEY_GRACE_MS: &str = "share_grace_ms";

pub const KNOWN_KEYS: [&str; 2] = [KEY_WINDOW_DAYS, KEY_GRACE_MS];

const DEFAULT_GRACE_MS: u64 = 5_000;

/// Runtime settings, stored in the `settings` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    pub daily_window_days: usize,
    pub share_grace_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            daily_window_days: DEFAULT_WINDOW_DAYS,
            share_grace_ms: DEFAULT_GRACE_MS,
        }
    }
}

impl Config {
    /// Reads every known key, falling back to defaults for absent ones.
    pub fn load(conn: &Connection) -> Result<Self, ConfigError> {
        let mut cfg = Config::default();
        for key in KNOWN_KEYS {
            if let Some(value) = get_setting(conn, key)? {
                cfg.apply(key, &value)?;
            }
        }
        Ok(cfg)
    }

    pub fn share_grace(&self) -> TimeDelta {
        TimeDelta::milliseconds(i64::try_from(self.share_grace_ms).unwrap_or(i64::MAX))
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        match key {
            KEY_WINDOW_DAYS => Ok(self.daily_window_days.to_string()),
            KEY_GRACE_MS => Ok(self.share_grace_ms.to_string()),
            other => Err(ConfigError::UnknownKey(other.to_string())),
        }
    }

    fn apply(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = |reason: &str| ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        };
        match key {
            KEY_WINDOW_DAYS => {
                let days: usize = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected a whole number of days"))?;
                if days == 0 || days > MAX_WINDOW_DAYS {
                    return Err(invalid(&format!("must be between 1 and {}", MAX_WINDOW_DAYS)));
                }
                self.daily_window_days = days;
            }
            KEY_GRACE_MS => {
                self.share_grace_ms = value
                    .trim()
                    .parse()
                    .map_err(|_| invalid("expected milliseconds"))?;
            }
            other => return Err(ConfigError::UnknownKey(other.to_string())),
        }
        Ok(())
    }
}

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>, ConfigError> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

/// Validates and stores one setting.
pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<(), ConfigError> {
    let mut probe = Config::default();
    probe.apply(key, value)?;
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value.trim()],
    )?;
    tracing::info!(key, value = value.trim(), "setting updated");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE settings(key TEXT PRIMARY KEY, value TEXT NOT NULL);")
            .unwrap();
        conn
    }

    #[test]
    fn defaults_when_table_is_empty() {
        assert_eq!(Config::load(&conn()).unwrap(), Config::default());
        assert_eq!(Config::default().share_grace(), TimeDelta::seconds(5));
    }

    #[test]
    fn stored_values_override_defaults() {
        let conn = conn();
        set_setting(&conn, KEY_WINDOW_DAYS, " 14 ").unwrap();
        set_setting(&conn, KEY_GRACE_MS, "0").unwrap();
        let cfg = Config::load(&conn).unwrap();
        assert_eq!(cfg.daily_window_days, 14);
        assert_eq!(cfg.share_grace_ms, 0);
        assert_eq!(cfg.get(KEY_WINDOW_DAYS).unwrap(), "14");
    }

    #[test]
    fn rejects_unknown_keys_and_bad_values() {
        let conn = conn();
        assert!(matches!(
            set_setting(&conn, "theme", "dark"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            set_setting(&conn, KEY_WINDOW_DAYS, "0"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_setting(&conn, KEY_GRACE_MS, "soon"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(get_setting(&conn, KEY_WINDOW_DAYS).unwrap(), None);
    }
}
