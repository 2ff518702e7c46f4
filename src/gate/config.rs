//! Connection settings for the RM identity API. Values are resolved by the CLI
//! (flags with env fallbacks) and handed to the client as a plain struct.
//! Configuration values are public; do not store secrets here.

use anyhow::{anyhow, Result};
use std::time::Duration;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8051";
pub const DEFAULT_USERS_PATH: &str = "/api/framework/v1/users";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct GateConfig {
    pub base_url: String,
    pub users_path: String,
    pub timeout: Duration,
    pub debug: bool,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            users_path: DEFAULT_USERS_PATH.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            debug: false,
        }
    }
}

impl GateConfig {
    /// Builds a config around `base_url`, keeping the default path and timeout.
    ///
    /// # Errors
    /// Returns an error if `base_url` is not an absolute http(s) URL.
    pub fn new(base_url: &str) -> Result<Self> {
        let base_url = normalize_base_url(base_url)?;
        Ok(Self {
            base_url,
            ..Self::default()
        })
    }

    #[must_use]
    pub fn with_users_path(mut self, users_path: &str) -> Self {
        self.users_path = normalize_path(users_path);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Joins the base URL with an API path, tolerating stray slashes on either side.
    #[must_use]
    pub fn url_for(&self, path: &str) -> String {
        let base = self.base_url.trim().trim_end_matches('/');
        let path = path.trim();

        if base.is_empty() {
            path.to_string()
        } else {
            format!("{}/{}", base, path.trim_start_matches('/'))
        }
    }

    /// Path of the identity endpoint for `username`, with the name encoded as a
    /// single path segment.
    #[must_use]
    pub fn user_path(&self, username: &str) -> String {
        let segment: String = url::form_urlencoded::byte_serialize(username.as_bytes())
            .collect::<String>()
            .replace('+', "%20");
        format!("{}/{}", self.users_path.trim_end_matches('/'), segment)
    }
}

fn normalize_base_url(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    let url = Url::parse(trimmed).map_err(|e| anyhow!("invalid API base URL {trimmed}: {e}"))?;

    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(anyhow!("unsupported scheme {scheme} in API base URL")),
    }

    if url.host().is_none() {
        return Err(anyhow!("API base URL has no host: {trimmed}"));
    }

    Ok(trimmed.trim_end_matches('/').to_string())
}

fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_end_matches('/');
    if trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_rm_framework_api() {
        let config = GateConfig::default();
        assert_eq!(config.base_url, "http://localhost:8051");
        assert_eq!(config.users_path, "/api/framework/v1/users");
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.debug);
    }

    #[test]
    fn new_rejects_bad_urls() {
        assert!(GateConfig::new("not a url").is_err());
        assert!(GateConfig::new("ftp://rm.example.com").is_err());
        assert!(GateConfig::new("https://rm.example.com:8051/").is_ok());
    }

    #[test]
    fn url_for_joins_slashes() {
        let config = GateConfig::new("https://rm.example.com:8051/").unwrap();
        assert_eq!(
            config.url_for("/api/framework/v1/users/alice"),
            "https://rm.example.com:8051/api/framework/v1/users/alice"
        );
        assert_eq!(
            config.url_for("api/x"),
            "https://rm.example.com:8051/api/x"
        );
    }

    #[test]
    fn user_path_encodes_segment() {
        let config = GateConfig::default().with_users_path("api/framework/v1/users/");
        assert_eq!(config.users_path, "/api/framework/v1/users");
        assert_eq!(config.user_path("alice"), "/api/framework/v1/users/alice");
        assert_eq!(
            config.user_path("jo silva/x"),
            "/api/framework/v1/users/jo%20silva%2Fx"
        );
    }
}
