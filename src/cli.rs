// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, value_parser};

use crate::analytics::MAX_WINDOW_DAYS;

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn month_arg() -> Arg {
    Arg::new("month")
        .long("month")
        .value_name("YYYY-MM")
        .help("Calendar month (defaults to the current month)")
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("amount")
            .long("amount")
            .required(required)
            .help("Positive amount"),
    )
    .arg(
        Arg::new("category")
            .long("category")
            .required(required)
            .help("Category label, e.g. Food"),
    )
    .arg(
        Arg::new("date")
            .long("date")
            .value_name("YYYY-MM-DD [HH:MM]")
            .help("When the expense happened"),
    )
    .arg(Arg::new("payment").long("payment").help("Payment method"))
    .arg(Arg::new("note").long("note").help("Free-form note"))
}

fn window_days(raw: &str) -> Result<usize, String> {
    let days: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a whole number of days", raw))?;
    if days > MAX_WINDOW_DAYS {
        return Err(format!("at most {} days", MAX_WINDOW_DAYS));
    }
    Ok(days)
}

fn id_arg() -> Arg {
    Arg::new("id").required(true).help("Transaction id")
}

pub fn build_cli() -> Command {
    Command::new("spendlens")
        .about("Personal expense tracking with category and daily spend analytics")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .value_name("PATH")
                .help("Use this SQLite file instead of the platform default"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("tx")
                .about("Record and manage transactions")
                .subcommand(tx_fields(Command::new("add").about("Record an expense"), true))
                .subcommand(json_flags(
                    Command::new("list")
                        .about("List transactions, newest first")
                        .arg(month_arg())
                        .arg(Arg::new("category").long("category"))
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("show").about("Show one transaction").arg(id_arg()),
                ))
                .subcommand(
                    tx_fields(Command::new("edit").about("Edit a transaction"), false)
                        .arg(id_arg())
                        .arg(
                            Arg::new("clear_payment")
                                .long("clear-payment")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("payment"),
                        )
                        .arg(
                            Arg::new("clear_note")
                                .long("clear-note")
                                .action(ArgAction::SetTrue)
                                .conflicts_with("note"),
                        ),
                )
                .subcommand(Command::new("rm").about("Delete a transaction").arg(id_arg())),
        )
        .subcommand(
            Command::new("report")
                .about("Analytics for one month")
                .subcommand(json_flags(
                    Command::new("categories")
                        .about("Share of spend per category")
                        .arg(month_arg()),
                ))
                .subcommand(json_flags(
                    Command::new("daily")
                        .about("Trailing daily spend")
                        .arg(month_arg())
                        .arg(
                            Arg::new("days")
                                .long("days")
                                .value_parser(window_days)
                                .help("Window length (defaults to the daily_window_days setting)"),
                        ),
                ))
                .subcommand(json_flags(
                    Command::new("summary")
                        .about("Totals for the month")
                        .arg(month_arg()),
                )),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("transactions")
                    .about("Write transactions to CSV or JSON")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .required(true)
                            .help("csv | json"),
                    )
                    .arg(Arg::new("out").long("out").required(true))
                    .arg(month_arg()),
            ),
        )
        .subcommand(
            Command::new("config")
                .about("Inspect and change settings")
                .subcommand(json_flags(Command::new("list").about("Show every setting")))
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                ),
        )
}
