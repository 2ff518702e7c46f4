use crate::cli::globals::GlobalArgs;
use crate::gate::{
    client::ApiClient,
    routes::{guard, Route},
    store::KeyValueStore,
};
use anyhow::Result;

/// Handle the status action
/// # Errors
/// Returns an error if the HTTP client cannot be built.
pub fn handle(globals: &GlobalArgs) -> Result<()> {
    let client = globals.client()?;
    println!("{}", status(&client));
    Ok(())
}

/// Session state, user and the route the dashboard shell would show.
pub fn status<S: KeyValueStore>(client: &ApiClient<S>) -> String {
    let state = client.session_state();
    let route = guard(Route::Dashboard, state);

    let user = if state.is_authenticated() {
        client
            .store()
            .load_profile()
            .and_then(|profile| profile.display_name())
            .map(|name| format!(" as {name}"))
            .unwrap_or_default()
    } else {
        String::new()
    };

    format!("{state}{user} (route: {})", route.path())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gate::{
        config::GateConfig, credentials::CredentialStore, profile::UserProfile, store::MemoryStore,
    };
    use secrecy::SecretString;
    use std::sync::Arc;

    #[test]
    fn status_follows_store() {
        let store = Arc::new(CredentialStore::new(MemoryStore::new()));
        let client = ApiClient::new(GateConfig::default(), store.clone()).unwrap();

        assert_eq!(status(&client), "unauthenticated (route: /)");

        store
            .save(
                "bob",
                &SecretString::from("pw".to_string()),
                &UserProfile::fallback("bob"),
            )
            .unwrap();
        assert_eq!(status(&client), "authenticated as bob (route: /dashboard)");
    }
}
