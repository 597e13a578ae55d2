// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::session;
use crate::utils::{maybe_print_json, pretty_table};

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    let s = session::current(conn)?;
    match m.subcommand() {
        Some(("show", sub)) => {
            let p = session::profile(conn, &s)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &p)? {
                let rows = vec![
                    vec!["Email".into(), p.email],
                    vec!["First name".into(), p.first_name.unwrap_or_default()],
                    vec!["Last name".into(), p.last_name.unwrap_or_default()],
                    vec!["Mobile".into(), p.mobile_number.unwrap_or_default()],
                    vec!["Member since".into(), p.created_at],
                ];
                println!("{}", pretty_table(&["Field", "Value"], rows));
            }
        }
        Some(("set-name", sub)) => {
            let first = sub.get_one::<String>("first").unwrap();
            let last = sub.get_one::<String>("last").unwrap();
            session::update_name(conn, &s, first, last)?;
            println!("Name updated");
        }
        Some(("set-password", sub)) => {
            let pw = sub.get_one::<String>("password").unwrap();
            session::update_password(conn, &s, pw)?;
            println!("Password updated");
        }
        _ => {}
    }
    Ok(())
}
