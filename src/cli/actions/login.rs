use crate::cli::globals::GlobalArgs;
use crate::gate::{
    client::ApiClient,
    form,
    routes::{guard, Route},
    store::KeyValueStore,
};
use anyhow::{anyhow, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub username: Option<String>,
    pub password: SecretString,
    pub remember: bool,
}

/// Handle the login action
/// # Errors
/// Returns an error if the form is invalid or RM refuses the credentials.
pub async fn handle(args: Args) -> Result<()> {
    let client = args.globals.client()?;
    let message = login(&client, &args).await?;
    println!("{message}");
    Ok(())
}

/// Runs the login form against `client` and returns the text to show.
/// # Errors
/// Returns an error carrying the user-facing message of the failure.
pub async fn login<S: KeyValueStore>(client: &ApiClient<S>, args: &Args) -> Result<String> {
    let store = client.store();

    let username = args
        .username
        .as_deref()
        .map(|name| name.trim().to_string())
        .or_else(|| store.remembered_username())
        .context("missing username: pass --username (add --remember to keep it)")?;

    form::validate(&username, args.password.expose_secret())
        .map_err(|errors| anyhow!("invalid login form: {errors}"))?;

    let profile = match client.login(&username, &args.password).await {
        Ok(profile) => profile,
        Err(e) => {
            debug!("login failed: {e}");
            let message = e.user_message();
            return Err(anyhow::Error::new(e).context(message));
        }
    };

    // A remembered username stays remembered until a login without it.
    let remember = args.remember || args.username.is_none();
    let preference = if remember {
        store.remember_username(&username)
    } else {
        store.forget_username()
    };
    if let Err(e) = preference {
        warn!("failed to update remembered username: {e:#}");
    }

    let name = profile.display_name().unwrap_or_else(|| username.clone());
    let route = guard(Route::Login, client.session_state());

    Ok(format!("Logged in as {name}. Redirecting to {}", route.path()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::bail;
    use serde_json::json;
    use std::{fs, net::TcpListener, path::Path};
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn args(uri: &str, store: &Path, username: Option<&str>, password: &str) -> Args {
        Args {
            globals: GlobalArgs::new(uri, store.to_path_buf()).unwrap(),
            username: username.map(ToString::to_string),
            password: SecretString::from(password.to_string()),
            remember: false,
        }
    }

    #[tokio::test]
    async fn login_writes_session_file() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;
        let store = dir.path().join("session.json");

        Mock::given(method("GET"))
            .and(path("/api/framework/v1/users/mestre"))
            .and(header("Authorization", "Basic bWVzdHJlOnRvdHZz"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "CODUSUARIO": "mestre", "NOME": "Mestre" })),
            )
            .mount(&server)
            .await;

        let mut login_args = args(&server.uri(), &store, Some("mestre"), "totvs");
        login_args.remember = true;
        let client = login_args.globals.client()?;

        let message = login(&client, &login_args).await?;
        assert_eq!(message, "Logged in as Mestre. Redirecting to /dashboard");

        // A fresh client over the same file sees the session.
        let reopened = login_args.globals.client()?;
        assert!(reopened.store().is_authenticated());
        assert_eq!(
            reopened.store().remembered_username().as_deref(),
            Some("mestre")
        );

        let raw: serde_json::Value = serde_json::from_str(&fs::read_to_string(&store)?)?;
        assert_eq!(raw["username"], "mestre");
        assert_eq!(raw["password"], "totvs");
        assert!(raw["user_data"].as_str().unwrap().contains("Mestre"));
        Ok(())
    }

    #[tokio::test]
    async fn username_is_trimmed_before_use() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;
        let store = dir.path().join("session.json");

        Mock::given(method("GET"))
            .and(path("/api/framework/v1/users/mestre"))
            .and(header("Authorization", "Basic bWVzdHJlOnRvdHZz"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mestre" })))
            .expect(1)
            .mount(&server)
            .await;

        let mut login_args = args(&server.uri(), &store, Some("  mestre "), "totvs");
        login_args.remember = true;
        let client = login_args.globals.client()?;

        login(&client, &login_args).await?;
        assert_eq!(client.store().username().as_deref(), Some("mestre"));
        assert_eq!(
            client.store().remembered_username().as_deref(),
            Some("mestre")
        );
        Ok(())
    }

    #[tokio::test]
    async fn remembered_username_is_reused() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;
        let store = dir.path().join("session.json");

        Mock::given(method("GET"))
            .and(path("/api/framework/v1/users/mestre"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "mestre" })))
            .mount(&server)
            .await;

        let login_args = args(&server.uri(), &store, None, "totvs");
        let client = login_args.globals.client()?;
        client.store().remember_username("mestre")?;

        let message = login(&client, &login_args).await?;
        assert_eq!(message, "Logged in as mestre. Redirecting to /dashboard");
        Ok(())
    }

    #[tokio::test]
    async fn bad_password_reports_user_message() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;
        let store = dir.path().join("session.json");

        Mock::given(method("GET"))
            .and(path("/api/framework/v1/users/mestre"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let login_args = args(&server.uri(), &store, Some("mestre"), "wrong");
        let client = login_args.globals.client()?;

        let Err(err) = login(&client, &login_args).await else {
            bail!("login should fail");
        };
        assert_eq!(err.to_string(), "Incorrect username or password.");
        assert!(!store.exists());
        Ok(())
    }

    #[tokio::test]
    async fn invalid_form_never_reaches_server() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;
        let dir = tempfile::tempdir()?;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let login_args = args(&server.uri(), &dir.path().join("s.json"), Some("mestre"), "pw");
        let client = login_args.globals.client()?;

        let err = login(&client, &login_args).await.unwrap_err();
        assert!(err.to_string().contains("at least 3 characters"));

        let login_args = args(&server.uri(), &dir.path().join("s.json"), None, "totvs");
        let err = login(&client, &login_args).await.unwrap_err();
        assert!(err.to_string().starts_with("missing username"));
        Ok(())
    }
}
