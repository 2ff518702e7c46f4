//! # rmgate
//!
//! Session gate for TOTVS RM dashboards. RM's framework API authenticates
//! every call with HTTP Basic auth, so the "session" is nothing more than the
//! stored username and password: a user is authenticated exactly when both are
//! present and non-empty.
//!
//! The library half ([`gate`]) holds the credential store, the API client and
//! the route guard. The [`cli`] half is the front end: `login`, `logout`,
//! `status` and `whoami` against a session file in the user config directory.

pub mod cli;
pub mod gate;
