use base64ct::{Base64, Encoding};
use secrecy::{ExposeSecret, SecretString};

/// Builds the `Authorization` header value for HTTP Basic auth.
/// The returned value embeds the password and must never be logged.
#[must_use]
pub fn authorization(username: &str, password: &SecretString) -> SecretString {
    let pair = format!("{username}:{}", password.expose_secret());
    SecretString::from(format!("Basic {}", Base64::encode_string(pair.as_bytes())))
}
