// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, OptionalExtension, params};
use std::env;
use std::fs;
use std::path::PathBuf;

use crate::aggregator::Calendar;
use crate::errors::{Error, Result};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketbook", "pocketbook"));

pub const DB_ENV: &str = "POCKETBOOK_DB";
pub const LOG_ENV: &str = "POCKETBOOK_LOG";
pub const DEFAULT_LOG_FILTER: &str = "pocketbook=warn";

/// Process-level settings, resolved from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub log_filter: String,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        // A missing .env is fine; real env vars still apply.
        dotenvy::dotenv().ok();
        let db_path = match env::var_os(DB_ENV) {
            Some(p) if !p.is_empty() => PathBuf::from(p),
            _ => default_db_path()?,
        };
        let log_filter = env::var(LOG_ENV)
            .or_else(|_| env::var("RUST_LOG"))
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.to_string());
        Ok(Self {
            db_path,
            log_filter,
        })
    }
}

pub fn default_db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .ok_or_else(|| Error::Config("could not determine platform-specific data dir".into()))?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir)
        .map_err(|e| Error::Config(format!("failed to create {}: {}", data_dir.display(), e)))?;
    Ok(data_dir.join("pocketbook.sqlite"))
}

// User-facing settings stored alongside the ledger.

pub const CURRENCY_SYMBOL: &str = "currency_symbol";
pub const TIMEZONE: &str = "timezone";
pub const KNOWN_SETTINGS: &[&str] = &[CURRENCY_SYMBOL, TIMEZONE];

pub fn get_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let v: Option<String> = conn
        .query_row("SELECT value FROM settings WHERE key=?1", params![key], |r| {
            r.get(0)
        })
        .optional()?;
    Ok(v)
}

pub fn set_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    match key {
        CURRENCY_SYMBOL => {}
        TIMEZONE => {
            value.parse::<Calendar>()?;
        }
        other => {
            return Err(Error::Validation(format!(
                "unknown setting '{}', expected one of: {}",
                other,
                KNOWN_SETTINGS.join(", ")
            )));
        }
    }
    conn.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![key, value],
    )?;
    Ok(())
}

/// Display prefix for amounts. Purely cosmetic: all amounts share one unit.
pub fn currency_symbol(conn: &Connection) -> Result<String> {
    Ok(get_setting(conn, CURRENCY_SYMBOL)?.unwrap_or_else(|| "$".to_string()))
}

/// Calendar used for month boundaries; device-local unless set to `utc`.
pub fn calendar(conn: &Connection) -> Result<Calendar> {
    match get_setting(conn, TIMEZONE)? {
        Some(v) => v.parse(),
        None => Ok(Calendar::Local),
    }
}
