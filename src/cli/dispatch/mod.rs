use crate::cli::{
    actions::{login, Action},
    globals::GlobalArgs,
};
use crate::gate::store::FileStore;
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

/// # Errors
/// Returns an error if required arguments are missing or invalid.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let (name, sub_m) = matches
        .subcommand()
        .context("missing subcommand")?;

    let globals = globals(sub_m)?;

    match name {
        "login" => Ok(Action::Login(login::Args {
            globals,
            username: sub_m.get_one::<String>("username").cloned(),
            password: sub_m
                .get_one::<String>("password")
                .cloned()
                .map(SecretString::from)
                .context("missing required argument: --password")?,
            remember: sub_m.get_flag("remember"),
        })),
        "logout" => Ok(Action::Logout(globals)),
        "status" => Ok(Action::Status(globals)),
        "whoami" => Ok(Action::Whoami(globals)),
        other => Err(anyhow!("unknown subcommand: {other}")),
    }
}

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>("api-url")
        .context("missing required argument: --api-url")?;

    let store_path = match matches.get_one::<String>("store") {
        Some(path) => PathBuf::from(path),
        None => FileStore::default_path()?,
    };

    let mut globals = GlobalArgs::new(api_url, store_path)?
        .with_timeout(matches.get_one::<u64>("timeout").copied().unwrap_or(30))
        .with_debug(matches.get_flag("debug"));

    if let Some(users_path) = matches.get_one::<String>("users-path") {
        globals = globals.with_users_path(users_path);
    }

    Ok(globals)
}
