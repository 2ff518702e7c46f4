//! Session credentials on top of a [`KeyValueStore`]. Username, password and
//! the cached profile are always written and removed together.

use super::{profile::UserProfile, store::KeyValueStore};
use anyhow::Result;
use secrecy::{ExposeSecret, SecretString};
use tracing::warn;

pub const USERNAME_KEY: &str = "username";
pub const PASSWORD_KEY: &str = "password";
pub const PROFILE_KEY: &str = "user_data";
pub const REMEMBER_KEY: &str = "remember_username";

const SESSION_KEYS: [&str; 3] = [USERNAME_KEY, PASSWORD_KEY, PROFILE_KEY];

/// Username and password read back from the store.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub struct CredentialStore<S> {
    backend: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(backend: S) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    /// Persists the three session entries. Content is not validated; empty
    /// values are stored as-is and read back as unauthenticated.
    ///
    /// # Errors
    /// Returns an error if the profile cannot be serialized or the backend write fails.
    pub fn save(&self, username: &str, password: &SecretString, profile: &UserProfile) -> Result<()> {
        let profile = serde_json::to_string(profile)?;
        self.backend.set_many(&[
            (USERNAME_KEY, username),
            (PASSWORD_KEY, password.expose_secret()),
            (PROFILE_KEY, profile.as_str()),
        ])
    }

    /// Removes the session entries. Calling it on an empty store is a no-op.
    ///
    /// # Errors
    /// Returns an error if the backend write fails.
    pub fn clear(&self) -> Result<()> {
        self.backend.remove_many(&SESSION_KEYS)
    }

    /// Like [`Self::clear`], but falls back to wiping the backend when the
    /// session entries cannot be removed one by one.
    ///
    /// # Errors
    /// Returns an error if the backend could not be wiped either.
    pub fn purge(&self) -> Result<()> {
        self.backend.purge(&SESSION_KEYS)
    }

    /// True when both username and password are stored and non-empty.
    /// Backend errors count as unauthenticated.
    pub fn is_authenticated(&self) -> bool {
        self.credentials().is_some()
    }

    pub fn credentials(&self) -> Option<Credentials> {
        let username = self.read(USERNAME_KEY)?;
        let password = self.read(PASSWORD_KEY)?;

        Some(Credentials {
            username,
            password: SecretString::from(password),
        })
    }

    pub fn username(&self) -> Option<String> {
        self.read(USERNAME_KEY)
    }

    /// Cached profile, or one built from the stored username when the cache is
    /// missing or unreadable.
    pub fn load_profile(&self) -> Option<UserProfile> {
        let cached = self
            .read(PROFILE_KEY)
            .and_then(|raw| serde_json::from_str::<serde_json::Value>(&raw).ok())
            .and_then(UserProfile::from_value);

        cached.or_else(|| self.username().map(|name| UserProfile::fallback(&name)))
    }

    /// # Errors
    /// Returns an error if the backend write fails.
    pub fn remember_username(&self, username: &str) -> Result<()> {
        self.backend.set(REMEMBER_KEY, username)
    }

    /// # Errors
    /// Returns an error if the backend write fails.
    pub fn forget_username(&self) -> Result<()> {
        self.backend.remove(REMEMBER_KEY)
    }

    pub fn remembered_username(&self) -> Option<String> {
        self.read(REMEMBER_KEY)
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(Some(value)) if !value.is_empty() => Some(value),
            Ok(_) => None,
            Err(e) => {
                warn!(key, "failed to read credential store: {e:#}");
                None
            }
        }
    }
}
