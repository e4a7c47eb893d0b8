// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use spendlens::clock::{Clock, SystemClock};
use spendlens::config::Config;
use spendlens::engine::AnalyticsEngine;
use spendlens::store::SqliteStore;
use spendlens::{cli, commands, db, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let cli = cli::build_cli();
    let matches = cli.get_matches();

    let db_override = matches.get_one::<String>("db").map(PathBuf::from);
    let conn = db::open_or_init(db_override.as_deref())?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    if let Some(("config", sub)) = matches.subcommand() {
        return commands::settings::handle(&conn, sub);
    }

    let config = Config::load(&conn)?;
    let store = Arc::new(SqliteStore::new(conn));

    match matches.subcommand() {
        Some(("init", _)) => {
            let path = db::resolve_path(db_override.as_deref())?;
            println!("Database initialized at {}", path.display());
        }
        Some(("tx", sub)) => commands::transactions::handle(&store, clock.as_ref(), sub)?,
        Some(("report", sub)) => {
            let engine = AnalyticsEngine::with_config(store.clone(), Arc::clone(&clock), &config);
            commands::reports::handle(&engine, &config, clock.today(), sub)?
        }
        Some(("export", sub)) => commands::exporter::handle(&store, sub)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
