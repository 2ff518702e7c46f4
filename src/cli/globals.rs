use crate::gate::{
    client::ApiClient, config::GateConfig, credentials::CredentialStore, store::FileStore,
};
use anyhow::{Context, Result};
use std::{path::PathBuf, sync::Arc, time::Duration};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: GateConfig,
    pub store_path: PathBuf,
}

impl GlobalArgs {
    /// # Errors
    /// Returns an error if `api_url` is not a valid http(s) URL.
    pub fn new(api_url: &str, store_path: PathBuf) -> Result<Self> {
        let config = GateConfig::new(api_url).context("invalid RMGATE_API_BASE_URL")?;
        Ok(Self { config, store_path })
    }

    #[must_use]
    pub fn with_users_path(mut self, users_path: &str) -> Self {
        self.config = self.config.with_users_path(users_path);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.config = self.config.with_timeout(Duration::from_secs(seconds));
        self
    }

    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.config = self.config.with_debug(debug);
        self
    }

    /// API client backed by the session file.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn client(&self) -> Result<ApiClient<FileStore>> {
        let store = Arc::new(CredentialStore::new(FileStore::new(&self.store_path)));
        ApiClient::new(self.config.clone(), store)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_global_args() {
        let args = GlobalArgs::new("https://rm.tld:8051", PathBuf::from("/tmp/session.json"))
            .unwrap()
            .with_timeout(5)
            .with_debug(true);
        assert_eq!(args.config.base_url, "https://rm.tld:8051");
        assert_eq!(args.config.timeout, Duration::from_secs(5));
        assert!(args.config.debug);
        assert_eq!(args.store_path, PathBuf::from("/tmp/session.json"));
    }

    #[test]
    fn test_global_args_rejects_bad_url() {
        assert!(GlobalArgs::new("rm.tld", PathBuf::from("session.json")).is_err());
    }
}
