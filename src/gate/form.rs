//! Login form checks run before anything is sent to RM.

use thiserror::Error;

/// Minimum password length accepted by the login form.
pub const MIN_PASSWORD_LEN: usize = 3;

#[derive(Clone, Debug, Default, PartialEq, Eq, Error)]
#[error("{}", joined(.username, .password))]
pub struct FormErrors {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl FormErrors {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

fn joined(username: &Option<String>, password: &Option<String>) -> String {
    [username.as_deref(), password.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join("; ")
}

/// Client-side checks run before a login request is sent.
///
/// # Errors
/// Returns the field errors when either field is invalid.
pub fn validate(username: &str, password: &str) -> Result<(), FormErrors> {
    let mut errors = FormErrors::default();

    if username.trim().is_empty() {
        errors.username = Some("Username is required".to_string());
    }

    if password.trim().is_empty() {
        errors.password = Some("Password is required".to_string());
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.password = Some(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
