// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Local identity provider: accounts, profiles and the active session.

use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::errors::{Error, Result};
use crate::models::{Profile, Session};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

const ACTIVE_SESSION_KEY: &str = "active_session";

#[derive(Debug, Clone, Default)]
pub struct SignUp {
    pub email: String,
    pub password: String,
    pub confirm: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub mobile_number: Option<String>,
}

fn digest(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// `salt$hexdigest`
fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    format!("{}${}", salt, digest(&salt, password))
}

fn verify_password(stored: &str, password: &str) -> bool {
    match stored.split_once('$') {
        Some((salt, hex)) => digest(salt, password) == hex,
        None => false,
    }
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(f, _)
            if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

pub fn validate_email(email: &str) -> Result<String> {
    let email = email.trim();
    if !EMAIL_RE.is_match(email) {
        return Err(Error::Validation(format!("'{}' is not a valid email", email)));
    }
    Ok(email.to_lowercase())
}

/// Creates an account and its profile. Does not sign in.
pub fn sign_up(conn: &Connection, req: SignUp) -> Result<Profile> {
    let email = validate_email(&req.email)?;
    if req.password.trim().is_empty() {
        return Err(Error::Validation("password must not be empty".into()));
    }
    if req.password != req.confirm {
        return Err(Error::Validation("passwords do not match".into()));
    }

    // The UNIQUE index on users.email decides who wins a concurrent sign-up.
    let user_id = Uuid::new_v4().to_string();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO users(id, email, password_hash) VALUES (?1, ?2, ?3)",
        params![user_id, email, hash_password(&req.password)],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            Error::EmailTaken(email.clone())
        } else {
            Error::Store(e)
        }
    })?;
    tx.execute(
        "INSERT INTO profiles(user_id, first_name, last_name, mobile_number) VALUES (?1, ?2, ?3, ?4)",
        params![
            user_id,
            non_blank(req.first_name),
            non_blank(req.last_name),
            non_blank(req.mobile_number)
        ],
    )?;
    tx.commit()?;
    tracing::info!(user = %user_id, "account created");
    load_profile(conn, &user_id)
}

/// Verifies credentials and makes the new session the active one.
pub fn sign_in(conn: &Connection, email: &str, password: &str) -> Result<Session> {
    let email = email.trim().to_lowercase();
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT id, email, password_hash FROM users WHERE email=?1",
            params![email],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    let (user_id, email, stored) = match row {
        Some(r) => r,
        None => {
            tracing::warn!("sign-in for unknown email");
            return Err(Error::InvalidCredentials);
        }
    };
    if !verify_password(&stored, password) {
        tracing::warn!(user = %user_id, "sign-in with wrong password");
        return Err(Error::InvalidCredentials);
    }

    let token = Uuid::new_v4().to_string();
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO sessions(token, user_id) VALUES (?1, ?2)",
        params![token, user_id],
    )?;
    tx.execute(
        "INSERT INTO settings(key, value) VALUES(?1, ?2)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![ACTIVE_SESSION_KEY, token],
    )?;
    tx.commit()?;
    tracing::info!(user = %user_id, "signed in");
    Ok(Session {
        token,
        user_id,
        email,
    })
}

/// Ends the active session. Returns false if nobody was signed in.
pub fn sign_out(conn: &Connection) -> Result<bool> {
    let token: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key=?1",
            params![ACTIVE_SESSION_KEY],
            |r| r.get(0),
        )
        .optional()?;
    let Some(token) = token else {
        return Ok(false);
    };
    let tx = conn.unchecked_transaction()?;
    tx.execute("DELETE FROM sessions WHERE token=?1", params![token])?;
    tx.execute(
        "DELETE FROM settings WHERE key=?1",
        params![ACTIVE_SESSION_KEY],
    )?;
    tx.commit()?;
    tracing::info!("signed out");
    Ok(true)
}

/// The active session, or [`Error::NotSignedIn`].
pub fn current(conn: &Connection) -> Result<Session> {
    let row: Option<(String, String, String)> = conn
        .query_row(
            "SELECT s.token, u.id, u.email FROM settings st
             JOIN sessions s ON s.token = st.value
             JOIN users u ON u.id = s.user_id
             WHERE st.key=?1",
            params![ACTIVE_SESSION_KEY],
            |r| Ok((r.get(0)?, r.get(1)?, r.get(2)?)),
        )
        .optional()?;
    match row {
        Some((token, user_id, email)) => Ok(Session {
            token,
            user_id,
            email,
        }),
        None => Err(Error::NotSignedIn),
    }
}

fn load_profile(conn: &Connection, user_id: &str) -> Result<Profile> {
    conn.query_row(
        "SELECT u.id, u.email, p.first_name, p.last_name, p.mobile_number, u.created_at
         FROM users u LEFT JOIN profiles p ON p.user_id = u.id
         WHERE u.id=?1",
        params![user_id],
        |r| {
            Ok(Profile {
                user_id: r.get(0)?,
                email: r.get(1)?,
                first_name: r.get(2)?,
                last_name: r.get(3)?,
                mobile_number: r.get(4)?,
                created_at: r.get(5)?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| Error::NotFound(format!("user {}", user_id)))
}

pub fn profile(conn: &Connection, session: &Session) -> Result<Profile> {
    load_profile(conn, &session.user_id)
}

pub fn update_name(
    conn: &Connection,
    session: &Session,
    first_name: &str,
    last_name: &str,
) -> Result<Profile> {
    conn.execute(
        "INSERT INTO profiles(user_id, first_name, last_name) VALUES (?1, ?2, ?3)
         ON CONFLICT(user_id) DO UPDATE SET first_name=excluded.first_name, last_name=excluded.last_name",
        params![
            session.user_id,
            non_blank(Some(first_name.to_string())),
            non_blank(Some(last_name.to_string()))
        ],
    )?;
    tracing::info!(user = %session.user_id, "name updated");
    load_profile(conn, &session.user_id)
}

pub fn update_password(conn: &Connection, session: &Session, new_password: &str) -> Result<()> {
    let new_password = new_password.trim();
    if new_password.is_empty() {
        return Err(Error::Validation("password cannot be empty".into()));
    }
    let n = conn.execute(
        "UPDATE users SET password_hash=?1 WHERE id=?2",
        params![hash_password(new_password), session.user_id],
    )?;
    if n == 0 {
        return Err(Error::NotFound(format!("user {}", session.user_id)));
    }
    tracing::info!(user = %session.user_id, "password updated");
    Ok(())
}
