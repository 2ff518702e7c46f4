//! Route guarding for the dashboard shell. Purely a UX gate: the RM server
//! still rejects requests without valid credentials.

use super::session::{SessionEvent, SessionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

impl Route {
    /// Unknown paths fall back to the login entry point.
    #[must_use]
    pub fn parse(path: &str) -> Self {
        match path.trim().trim_end_matches('/') {
            "/dashboard" | "dashboard" => Self::Dashboard,
            _ => Self::Login,
        }
    }

    #[must_use]
    pub fn path(self) -> &'static str {
        match self {
            Self::Login => "/",
            Self::Dashboard => "/dashboard",
        }
    }
}

/// Resolves the route actually shown for `requested`.
#[must_use]
pub fn guard(requested: Route, state: SessionState) -> Route {
    match (requested, state.is_authenticated()) {
        (Route::Dashboard, false) => Route::Login,
        (Route::Login, true) => Route::Dashboard,
        (route, _) => route,
    }
}

/// Where the application navigates after a session event, if anywhere.
#[must_use]
pub fn redirect_for(event: &SessionEvent) -> Option<Route> {
    match event {
        SessionEvent::SessionExpired { .. } | SessionEvent::LoggedOut => Some(Route::Login),
        SessionEvent::LoggedIn { .. } => Some(Route::Dashboard),
    }
}
