//! HTTP client for the RM API. Every request goes through the same two hooks:
//! the outgoing side attaches Basic auth from the credential store, and the
//! incoming side purges the store and publishes [`SessionEvent::SessionExpired`]
//! when the server answers 401. Navigation is left to whoever subscribes.
//!
//! The password only leaves this module inside the `Authorization` header and
//! is never logged, even with `debug` enabled.

use super::{
    basic,
    config::GateConfig,
    credentials::CredentialStore,
    errors::{ApiError, LoginError},
    profile::UserProfile,
    session::{SessionEvent, SessionState},
    store::KeyValueStore,
    APP_USER_AGENT,
};
use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    Client, Method, RequestBuilder, StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument, warn};

/// Maximum number of error body characters surfaced to callers.
const MAX_ERROR_CHARS: usize = 200;
const EVENT_CAPACITY: usize = 16;

pub struct ApiClient<S> {
    config: GateConfig,
    http: Client,
    store: Arc<CredentialStore<S>>,
    events: broadcast::Sender<SessionEvent>,
    login_in_flight: AtomicBool,
}

// Resets the in-flight flag however the login future ends.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: KeyValueStore> ApiClient<S> {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: GateConfig, store: Arc<CredentialStore<S>>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = Client::builder()
            .user_agent(APP_USER_AGENT)
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;

        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Ok(Self {
            config,
            http,
            store,
            events,
            login_in_flight: AtomicBool::new(false),
        })
    }

    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &Arc<CredentialStore<S>> {
        &self.store
    }

    /// Subscribes to session events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        if self.login_in_flight.load(Ordering::Acquire) {
            SessionState::Authenticating
        } else if self.store.is_authenticated() {
            SessionState::Authenticated
        } else {
            SessionState::Unauthenticated
        }
    }

    /// Checks `username`/`password` against the identity endpoint and, on
    /// success, stores them together with the returned profile.
    ///
    /// The request carries its own Basic header built from the arguments, and
    /// a 401 here is a bad password, not an expired session: the store is left
    /// exactly as it was on every failure.
    ///
    /// # Errors
    /// Returns the [`LoginError`] kind matching the failure.
    #[instrument(skip(self, password))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<UserProfile, LoginError> {
        if self
            .login_in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("login rejected: another login is in progress");
            return Err(LoginError::InProgress);
        }
        let _in_flight = InFlight(&self.login_in_flight);

        let url = self.config.url_for(&self.config.user_path(username));
        let authorization = basic::authorization(username, password);

        self.trace_request(&Method::GET, &url);

        let response = self
            .http
            .get(&url)
            .header(AUTHORIZATION, authorization.expose_secret())
            .send()
            .await
            .map_err(|e| {
                error!("login request failed: {e}");
                LoginError::from(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(LoginError::from)?;
        self.trace_response(&url, status, &body);

        if !status.is_success() {
            let err = LoginError::from_status(status.as_u16(), server_message(&body));
            info!(status = status.as_u16(), "login refused: {err}");
            return Err(err);
        }

        let profile = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(UserProfile::from_value)
            .ok_or_else(|| LoginError::Unknown {
                status: Some(status.as_u16()),
                message: Some("identity endpoint returned an invalid profile".to_string()),
            })?;

        self.store
            .save(username, password, &profile)
            .map_err(|e| LoginError::Store(format!("{e:#}")))?;

        info!("login succeeded");
        self.publish(SessionEvent::LoggedIn {
            username: username.to_string(),
        });

        Ok(profile)
    }

    /// Ends the local session. Never fails: if the session entries cannot be
    /// removed, the backend is wiped and remaining failures are only logged.
    #[instrument(skip(self))]
    pub fn logout(&self) {
        self.purge();

        info!("logged out");
        self.publish(SessionEvent::LoggedOut);
    }

    /// Re-reads the profile of the stored user through the authenticated path.
    ///
    /// # Errors
    /// Returns [`ApiError::NotAuthenticated`] when no user is stored, or any
    /// error from [`Self::get_json`].
    pub async fn fetch_user_info(&self) -> Result<UserProfile, ApiError> {
        let username = self.store.username().ok_or(ApiError::NotAuthenticated)?;
        let value: Value = self.get_json(&self.config.user_path(&username)).await?;
        UserProfile::from_value(value)
            .ok_or_else(|| ApiError::Decode("profile is not a JSON object".to_string()))
    }

    /// GETs `path` and decodes the JSON body.
    ///
    /// # Errors
    /// Returns [`ApiError::SessionExpired`] on 401 (after purging the store),
    /// [`ApiError::Http`] for other non-2xx statuses, or a transport/decode error.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let body = self.execute(Method::GET, path, None::<&()>).await?;
        decode(&body)
    }

    /// POSTs `body` as JSON to `path` and decodes the JSON response.
    ///
    /// # Errors
    /// Same as [`Self::get_json`].
    pub async fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = self.execute(Method::POST, path, Some(body)).await?;
        decode(&body)
    }

    #[instrument(skip(self, body))]
    async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<String, ApiError> {
        let url = self.config.url_for(path);
        self.trace_request(&method, &url);

        let mut request = self.authorize(self.http.request(method, &url));
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            self.expire(path);
            return Err(ApiError::SessionExpired);
        }

        let body = response.text().await?;
        self.trace_response(&url, status, &body);

        if status.is_success() {
            return Ok(body);
        }

        Err(ApiError::Http {
            status: status.as_u16(),
            message: sanitize_body(&body),
        })
    }

    // Outgoing hook: attach Basic auth only when both fields are stored.
    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.store.credentials() {
            Some(credentials) => {
                let authorization = basic::authorization(&credentials.username, &credentials.password);
                request.header(AUTHORIZATION, authorization.expose_secret())
            }
            None => request,
        }
    }

    // Incoming hook for 401: purge, then tell subscribers.
    fn expire(&self, path: &str) {
        warn!(path, "server rejected stored credentials, clearing session");

        self.purge();

        self.publish(SessionEvent::SessionExpired {
            path: path.to_string(),
        });
    }

    fn purge(&self) {
        if let Err(e) = self.store.clear() {
            warn!("failed to clear session, wiping the store: {e:#}");
            if let Err(e) = self.store.purge() {
                error!("failed to wipe session store: {e:#}");
            }
        }
    }

    fn publish(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn trace_request(&self, method: &Method, url: &str) {
        if self.config.debug {
            info!(%method, url, "request");
        } else {
            debug!(%method, url, "request");
        }
    }

    fn trace_response(&self, url: &str, status: StatusCode, body: &str) {
        if self.config.debug {
            info!(url, status = status.as_u16(), body, "response");
        } else {
            debug!(url, status = status.as_u16(), "response");
        }
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Pulls a human readable message out of an RM error body, if there is one.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "Message", "detail"]
        .iter()
        .find_map(|key| value.get(*key).and_then(Value::as_str))
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map(ToString::to_string)
}

/// Trims and truncates error bodies before they reach the user.
fn sanitize_body(body: &str) -> String {
    if let Some(message) = server_message(body) {
        return message.chars().take(MAX_ERROR_CHARS).collect();
    }

    let trimmed = body.trim();
    if trimmed.is_empty() {
        "Request failed.".to_string()
    } else {
        trimmed.chars().take(MAX_ERROR_CHARS).collect()
    }
}
