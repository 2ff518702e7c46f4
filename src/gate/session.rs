use serde::Serialize;

/// Session state as seen by the application. It is derived from the
/// credential store, never stored on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(self) -> bool {
        self == Self::Authenticated
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Authenticating => "authenticating",
            Self::Authenticated => "authenticated",
        };
        f.write_str(label)
    }
}

/// Events the HTTP layer publishes for the application to react to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A request was answered with 401 and local credentials were purged.
    SessionExpired { path: String },
    LoggedIn { username: String },
    LoggedOut,
}
