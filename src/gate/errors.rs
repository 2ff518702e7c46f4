use thiserror::Error;

/// Failures surfaced by [`crate::gate::ApiClient::login`]. None of them mutate
/// the credential store.
#[derive(Debug, Error)]
pub enum LoginError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("unknown user")]
    UnknownUser,
    #[error("rate limited")]
    RateLimited,
    #[error("request timed out")]
    Timeout,
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("login failed ({}): {}", display_status(.status), .message.as_deref().unwrap_or("no message"))]
    Unknown {
        status: Option<u16>,
        message: Option<String>,
    },
    #[error("a login request is already in progress")]
    InProgress,
    #[error("credential store error: {0}")]
    Store(String),
}

impl LoginError {
    /// Message shown to the person at the login form.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidCredentials => "Incorrect username or password.".to_string(),
            Self::UnknownUser => "User not found.".to_string(),
            Self::RateLimited => "Too many login attempts. Try again later.".to_string(),
            Self::Timeout => "Request timed out. Check your connection.".to_string(),
            Self::NetworkUnreachable(_) => {
                "Connection error. Check your network and the API URL.".to_string()
            }
            Self::Unknown {
                message: Some(message),
                ..
            } => message.clone(),
            Self::Unknown { message: None, .. } => "Login failed. Please try again.".to_string(),
            Self::InProgress => "Login already in progress.".to_string(),
            Self::Store(_) => "Unable to save the session locally.".to_string(),
        }
    }

    pub(crate) fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => Self::InvalidCredentials,
            404 => Self::UnknownUser,
            429 => Self::RateLimited,
            _ => Self::Unknown {
                status: Some(status),
                message,
            },
        }
    }
}

/// Failures of authenticated requests made after login.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered 401; the local session has already been cleared.
    #[error("session expired")]
    SessionExpired,
    #[error("not authenticated")]
    NotAuthenticated,
    #[error("request failed ({status}): {message}")]
    Http { status: u16, message: String },
    #[error("request timed out")]
    Timeout,
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("credential store error: {0}")]
    Store(String),
}

/// Transport-level classification shared by both error types.
pub(crate) enum Transport {
    Timeout,
    Unreachable(String),
    Other(String),
}

pub(crate) fn classify(err: &reqwest::Error) -> Transport {
    if err.is_timeout() {
        Transport::Timeout
    } else if err.is_connect() || err.is_request() || err.is_body() {
        Transport::Unreachable(err.to_string())
    } else {
        Transport::Other(err.to_string())
    }
}

impl From<reqwest::Error> for LoginError {
    fn from(err: reqwest::Error) -> Self {
        match classify(&err) {
            Transport::Timeout => Self::Timeout,
            Transport::Unreachable(message) => Self::NetworkUnreachable(message),
            Transport::Other(message) => Self::Unknown {
                status: err.status().map(|s| s.as_u16()),
                message: Some(message),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        match classify(&err) {
            Transport::Timeout => Self::Timeout,
            Transport::Unreachable(message) => Self::NetworkUnreachable(message),
            Transport::Other(message) => Self::Decode(message),
        }
    }
}

fn display_status(status: &Option<u16>) -> String {
    status.map_or_else(|| "no status".to_string(), |s| s.to_string())
}
