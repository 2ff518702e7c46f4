//! Session gate for the RM dashboard: credential persistence, Basic-auth
//! request signing, 401 handling and route guarding. This module touches
//! security boundaries and must never log the password or the
//! `Authorization` header.
//!
//! Flow Overview: `login` checks the credentials against the identity
//! endpoint and persists them with the returned profile. Every later request
//! is signed from the store; a 401 purges the store and publishes
//! `SessionEvent::SessionExpired`, which the application maps to the login
//! route.

mod basic;
pub mod client;
pub mod config;
pub mod credentials;
pub mod errors;
pub mod form;
pub mod profile;
pub mod routes;
pub mod session;
pub mod store;

pub use self::basic::authorization;
pub use self::client::ApiClient;
pub use self::config::GateConfig;
pub use self::credentials::{CredentialStore, Credentials};
pub use self::errors::{ApiError, LoginError};
pub use self::profile::UserProfile;
pub use self::routes::{guard, redirect_for, Route};
pub use self::session::{SessionEvent, SessionState};
pub use self::store::{FileStore, KeyValueStore, MemoryStore};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
