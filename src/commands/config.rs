// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::config::{KNOWN_SETTINGS, get_setting, set_setting};
use crate::utils::pretty_table;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            match get_setting(conn, key)? {
                Some(v) => println!("{}", v),
                None => println!("{} is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = sub.get_one::<String>("key").unwrap();
            let value = sub.get_one::<String>("value").unwrap();
            set_setting(conn, key, value.trim())?;
            println!("{} = {}", key, value.trim());
        }
        Some(("list", _)) => {
            let mut data = Vec::new();
            for key in KNOWN_SETTINGS {
                data.push(vec![
                    key.to_string(),
                    get_setting(conn, key)?.unwrap_or_else(|| "(default)".into()),
                ]);
            }
            println!("{}", pretty_table(&["Setting", "Value"], data));
        }
        _ => {}
    }
    Ok(())
}
