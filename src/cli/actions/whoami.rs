use crate::cli::globals::GlobalArgs;
use crate::gate::{
    client::ApiClient,
    errors::ApiError,
    routes::{guard, redirect_for, Route},
    session::SessionEvent,
    store::KeyValueStore,
};
use anyhow::{anyhow, Result};
use tracing::debug;

/// Handle the whoami action
/// # Errors
/// Returns an error if there is no session or RM rejects it.
pub async fn handle(globals: &GlobalArgs) -> Result<()> {
    let client = globals.client()?;
    println!("{}", whoami(&client).await?);
    Ok(())
}

/// Fetches the stored user's profile from RM and renders it.
/// # Errors
/// Returns an error naming the route to go to when the session is missing or expired.
pub async fn whoami<S: KeyValueStore>(client: &ApiClient<S>) -> Result<String> {
    if guard(Route::Dashboard, client.session_state()) == Route::Login {
        return Err(anyhow!("Not logged in. Run `rmgate login`."));
    }

    let mut events = client.subscribe();

    match client.fetch_user_info().await {
        Ok(profile) => {
            let mut lines = Vec::new();
            if let Some(name) = profile.display_name() {
                lines.push(format!("name:  {name}"));
            }
            if let Some(id) = profile.id() {
                lines.push(format!("id:    {id}"));
            }
            if let Some(email) = profile.email() {
                lines.push(format!("email: {email}"));
            }
            lines.push(serde_json::to_string_pretty(&profile)?);
            Ok(lines.join("\n"))
        }
        Err(ApiError::SessionExpired) => {
            let route = std::iter::from_fn(|| events.try_recv().ok())
                .inspect(|event| debug!(?event, "session event"))
                .find(|event| matches!(event, SessionEvent::SessionExpired { .. }))
                .and_then(|event| redirect_for(&event))
                .unwrap_or(Route::Login);
            Err(anyhow!(
                "Session expired. Log in again (redirecting to {}).",
                route.path()
            ))
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gate::{
        config::GateConfig, credentials::CredentialStore, profile::UserProfile, store::MemoryStore,
    };
    use secrecy::SecretString;
    use serde_json::json;
    use std::{net::TcpListener, sync::Arc};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn client(uri: &str) -> ApiClient<MemoryStore> {
        let store = Arc::new(CredentialStore::new(MemoryStore::new()));
        store
            .save(
                "bob",
                &SecretString::from("pw".to_string()),
                &UserProfile::fallback("bob"),
            )
            .unwrap();
        ApiClient::new(GateConfig::new(uri).unwrap(), store).unwrap()
    }

    #[tokio::test]
    async fn whoami_renders_profile() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/framework/v1/users/bob"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "bob",
                "name": "Bob Souza",
                "email": "bob@rm.local"
            })))
            .mount(&server)
            .await;

        let output = whoami(&client(&server.uri())).await?;
        assert!(output.starts_with("name:  Bob Souza\nid:    bob\nemail: bob@rm.local"));
        Ok(())
    }

    #[tokio::test]
    async fn whoami_expired_session_redirects_to_login() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/framework/v1/users/bob"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let client = client(&server.uri());
        let err = whoami(&client).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "Session expired. Log in again (redirecting to /)."
        );
        assert!(!client.store().is_authenticated());
        assert_eq!(client.store().load_profile(), None);
        Ok(())
    }

    #[tokio::test]
    async fn whoami_requires_session() {
        let store = Arc::new(CredentialStore::new(MemoryStore::new()));
        let client = ApiClient::new(GateConfig::default(), store).unwrap();
        let err = whoami(&client).await.unwrap_err();
        assert_eq!(err.to_string(), "Not logged in. Run `rmgate login`.");
    }
}
