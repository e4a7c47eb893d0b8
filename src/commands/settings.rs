// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::required;
use crate::config::{Config, KNOWN_KEYS, set_setting};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let cfg = Config::load(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cfg)? {
                let mut data = Vec::new();
                for key in KNOWN_KEYS {
                    data.push(vec![key.to_string(), cfg.get(key)?]);
                }
                println!("{}", pretty_table(&["Key", "Value"], data));
            }
        }
        Some(("get", sub)) => {
            let key = required(sub, "key")?.trim();
            println!("{}", Config::load(conn)?.get(key)?);
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?.trim();
            let value = required(sub, "value")?;
            set_setting(conn, key, value)?;
            println!("Set {} = {}", key, value.trim());
        }
        _ => {}
    }
    Ok(())
}
