use crate::cli::{actions::Action, commands, dispatch::handler, telemetry};
use anyhow::Result;
use clap::ArgMatches;
use tracing::Level;

/// Start the CLI
/// # Errors
/// Returns an error if logging cannot be initialized or the arguments are invalid.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let json = sub_flag(&matches, "log-json");

    telemetry::init(Some(log_level(&matches)), json)?;

    handler(&matches)
}

fn log_level(matches: &ArgMatches) -> Level {
    let verbosity = matches
        .subcommand()
        .map_or(matches, |(_, sub)| sub)
        .get_one::<u8>("verbosity")
        .copied()
        .unwrap_or(0);
    telemetry::level_for(verbosity, sub_flag(matches, "debug"))
}

// Global flags are read from the subcommand so they work on either side of it.
fn sub_flag(matches: &ArgMatches, id: &str) -> bool {
    matches
        .subcommand()
        .is_some_and(|(_, sub)| sub.get_flag(id))
}
