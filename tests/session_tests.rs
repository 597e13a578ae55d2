// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::db;
use pocketbook::errors::Error;
use pocketbook::session::{self, SignUp};
use rusqlite::Connection;

fn signup(email: &str, password: &str) -> SignUp {
    SignUp {
        email: email.into(),
        password: password.into(),
        confirm: password.into(),
        first_name: Some("Ada".into()),
        last_name: Some("Lovelace".into()),
        mobile_number: Some("  ".into()),
    }
}

fn setup() -> Connection {
    let conn = db::open_in_memory().unwrap();
    session::sign_up(&conn, signup("Ada@Example.com", "s3cret")).unwrap();
    conn
}

#[test]
fn sign_up_creates_profile_with_normalised_fields() {
    let conn = setup();
    let s = session::sign_in(&conn, "ada@example.com", "s3cret").unwrap();
    let p = session::profile(&conn, &s).unwrap();
    assert_eq!(p.email, "ada@example.com");
    assert_eq!(p.first_name.as_deref(), Some("Ada"));
    assert_eq!(p.mobile_number, None);
}

#[test]
fn sign_up_rejects_bad_input() {
    let conn = setup();
    let err = session::sign_up(&conn, signup("not-an-email", "pw")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let mut mismatch = signup("bob@example.com", "pw");
    mismatch.confirm = "other".into();
    let err = session::sign_up(&conn, mismatch).unwrap_err();
    assert!(err.to_string().contains("do not match"));

    let err = session::sign_up(&conn, signup("ADA@example.com", "x")).unwrap_err();
    assert!(matches!(err, Error::EmailTaken(_)));
}

#[test]
fn duplicate_sign_up_is_email_taken_not_a_store_failure() {
    let conn = setup();
    let err = session::sign_up(&conn, signup("ada@example.com", "other")).unwrap_err();
    assert!(matches!(err, Error::EmailTaken(ref e) if e == "ada@example.com"));
    assert!(!err.is_retryable());

    let users: i64 = conn
        .query_row("SELECT COUNT(*) FROM users", [], |r| r.get(0))
        .unwrap();
    let profiles: i64 = conn
        .query_row("SELECT COUNT(*) FROM profiles", [], |r| r.get(0))
        .unwrap();
    assert_eq!((users, profiles), (1, 1));
}

#[test]
fn sign_in_requires_matching_password() {
    let conn = setup();
    let err = session::sign_in(&conn, "ada@example.com", "wrong").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
    let err = session::sign_in(&conn, "nobody@example.com", "s3cret").unwrap_err();
    assert!(matches!(err, Error::InvalidCredentials));
    assert!(matches!(
        session::current(&conn).unwrap_err(),
        Error::NotSignedIn
    ));
}

#[test]
fn session_lifecycle() {
    let conn = setup();
    let s = session::sign_in(&conn, " ADA@example.com ", "s3cret").unwrap();
    assert_eq!(session::current(&conn).unwrap(), s);

    assert!(session::sign_out(&conn).unwrap());
    assert!(matches!(
        session::current(&conn).unwrap_err(),
        Error::NotSignedIn
    ));
    assert!(!session::sign_out(&conn).unwrap());
}

#[test]
fn profile_edits_apply_to_signed_in_user() {
    let conn = setup();
    let s = session::sign_in(&conn, "ada@example.com", "s3cret").unwrap();

    let p = session::update_name(&conn, &s, "Augusta", " ").unwrap();
    assert_eq!(p.first_name.as_deref(), Some("Augusta"));
    assert_eq!(p.last_name, None);

    assert!(session::update_password(&conn, &s, "   ").is_err());
    session::update_password(&conn, &s, " n3w ").unwrap();
    session::sign_out(&conn).unwrap();
    assert!(session::sign_in(&conn, "ada@example.com", "s3cret").is_err());
    session::sign_in(&conn, "ada@example.com", "n3w").unwrap();
}
