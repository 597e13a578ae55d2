// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{Arg, ArgAction, Command, crate_version, value_parser};

use crate::aggregator::MAX_MONTHS_BACK;

fn json_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print as JSON lines"),
    )
}

fn opt(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).num_args(1).help(help)
}

fn req(name: &'static str, help: &'static str) -> Arg {
    opt(name, help).required(true)
}

fn record_list(name: &'static str, label: &'static str, about: &'static str) -> Command {
    json_args(
        Command::new(name)
            .about(about)
            .arg(
                opt("within", "Recency window: all | 1d | 7d (elapsed time)")
                    .default_value("all"),
            )
            .arg(opt("month", "Only records in this month (YYYY-MM)"))
            .arg(opt(label, "Only records with this exact label"))
            .arg(opt("limit", "Show at most N records").value_parser(value_parser!(usize))),
    )
}

fn record_add(name: &'static str, label: &'static str, about: &'static str) -> Command {
    Command::new(name)
        .about(about)
        .arg(req(label, "Label of the record"))
        .arg(req("amount", "Non-negative amount").allow_hyphen_values(true))
        .arg(opt("description", "Optional free-text note"))
        .arg(opt(
            "date",
            "When it happened: YYYY-MM-DD or RFC 3339 (default: now)",
        ))
}

pub fn build_cli() -> Command {
    Command::new("pocketbook")
        .version(crate_version!())
        .about("Personal income/expense ledger with monthly summaries")
        .subcommand(Command::new("init").about("Create the ledger database"))
        .subcommand(
            Command::new("signup")
                .about("Create an account")
                .arg(req("email", "Email address"))
                .arg(req("password", "Password"))
                .arg(req("confirm", "Password again"))
                .arg(opt("first-name", "First name"))
                .arg(opt("last-name", "Last name"))
                .arg(opt("mobile", "Mobile number")),
        )
        .subcommand(
            Command::new("signin")
                .about("Sign in and make the session active")
                .arg(req("email", "Email address"))
                .arg(req("password", "Password")),
        )
        .subcommand(Command::new("signout").about("End the active session"))
        .subcommand(
            Command::new("profile")
                .about("Show or edit the signed-in profile")
                .subcommand(json_args(Command::new("show").about("Show profile")))
                .subcommand(
                    Command::new("set-name")
                        .about("Update first and last name")
                        .arg(req("first", "First name"))
                        .arg(req("last", "Last name")),
                )
                .subcommand(
                    Command::new("set-password")
                        .about("Change password")
                        .arg(req("password", "New password")),
                ),
        )
        .subcommand(
            Command::new("income")
                .about("Record and list income")
                .subcommand(record_add("add", "source", "Record income"))
                .subcommand(record_list("list", "source", "List income, newest first")),
        )
        .subcommand(
            Command::new("expense")
                .about("Record and list expenses")
                .subcommand(record_add("add", "category", "Record an expense"))
                .subcommand(record_list(
                    "list",
                    "category",
                    "List expenses, newest first",
                )),
        )
        .subcommand(
            Command::new("summary")
                .about("Aggregated views of the ledger")
                .subcommand(json_args(
                    Command::new("month")
                        .about("Income, expenses and net balance for a month")
                        .arg(opt("month", "Month (YYYY-MM), default: current"))
                        .arg(
                            Arg::new("cumulative")
                                .long("cumulative")
                                .action(ArgAction::SetTrue)
                                .help("Also show all-time totals up to the end of the month"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("cashflow")
                        .about("Monthly income vs. expenses for recent months")
                        .arg(
                            opt("months", "How many months back")
                                .value_parser(
                                    value_parser!(u32).range(1..=i64::from(MAX_MONTHS_BACK)),
                                )
                                .default_value("6"),
                        ),
                ))
                .subcommand(json_args(
                    Command::new("categories")
                        .about("Expenses by category and income by source")
                        .arg(opt("month", "Month (YYYY-MM), default: current")),
                )),
        )
        .subcommand(
            Command::new("export")
                .about("Export the signed-in user's records")
                .subcommand(
                    Command::new("ledger")
                        .about("Export income and expenses")
                        .arg(req("format", "csv | json"))
                        .arg(req("out", "Output file path")),
                ),
        )
        .subcommand(Command::new("doctor").about("Check the ledger for data-quality issues"))
        .subcommand(
            Command::new("config")
                .about("Read and change settings")
                .subcommand(Command::new("get").arg(Arg::new("key").required(true)))
                .subcommand(
                    Command::new("set")
                        .arg(Arg::new("key").required(true))
                        .arg(Arg::new("value").required(true)),
                )
                .subcommand(Command::new("list")),
        )
}
