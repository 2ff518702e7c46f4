use crate::cli::globals::GlobalArgs;
use crate::gate::{client::ApiClient, store::KeyValueStore};
use anyhow::Result;

/// Handle the logout action
/// # Errors
/// Returns an error only if the HTTP client cannot be built; clearing the
/// session itself never fails.
pub fn handle(globals: &GlobalArgs) -> Result<()> {
    let client = globals.client()?;
    println!("{}", logout(&client));
    Ok(())
}

pub fn logout<S: KeyValueStore>(client: &ApiClient<S>) -> String {
    let was_authenticated = client.store().is_authenticated();
    client.logout();

    if was_authenticated {
        "Logged out.".to_string()
    } else {
        "No active session.".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::gate::profile::UserProfile;
    use secrecy::SecretString;

    #[test]
    fn logout_removes_session_file_entries() {
        let dir = tempfile::tempdir().unwrap();
        let globals = GlobalArgs::new("http://localhost:8051", dir.path().join("session.json")).unwrap();
        let client = globals.client().unwrap();
        client
            .store()
            .save(
                "bob",
                &SecretString::from("pw".to_string()),
                &UserProfile::fallback("bob"),
            )
            .unwrap();

        assert_eq!(logout(&client), "Logged out.");
        assert!(!globals.client().unwrap().store().is_authenticated());
        assert_eq!(logout(&client), "No active session.");
    }

    #[test]
    fn logout_without_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rmgate").join("session.json");
        let globals = GlobalArgs::new("http://localhost:8051", path.clone()).unwrap();
        let client = globals.client().unwrap();
        assert_eq!(logout(&client), "No active session.");
        assert!(!path.exists());
    }
}
