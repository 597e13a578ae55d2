// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rusqlite::Connection;

use crate::session::{self, SignUp};

fn arg(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).map(|s| s.to_string())
}

pub fn signup(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let req = SignUp {
        email: arg(sub, "email").unwrap_or_default(),
        password: arg(sub, "password").unwrap_or_default(),
        confirm: arg(sub, "confirm").unwrap_or_default(),
        first_name: arg(sub, "first-name"),
        last_name: arg(sub, "last-name"),
        mobile_number: arg(sub, "mobile"),
    };
    let profile = session::sign_up(conn, req)?;
    println!(
        "Account created for {}. Sign in with `pocketbook signin`.",
        profile.email
    );
    Ok(())
}

pub fn signin(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let email = sub.get_one::<String>("email").unwrap();
    let password = sub.get_one::<String>("password").unwrap();
    let s = session::sign_in(conn, email, password)?;
    println!("Signed in as {}", s.email);
    Ok(())
}

pub fn signout(conn: &Connection) -> Result<()> {
    if session::sign_out(conn)? {
        println!("Signed out");
    } else {
        println!("Nobody is signed in");
    }
    Ok(())
}
