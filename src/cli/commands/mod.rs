use crate::gate::config::{DEFAULT_BASE_URL, DEFAULT_USERS_PATH};
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ArgAction, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("rmgate")
        .about("TOTVS RM session gate")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("RM API base URL, example: https://rm.tld:8051")
                .default_value(DEFAULT_BASE_URL)
                .env("RMGATE_API_BASE_URL")
                .global(true),
        )
        .arg(
            Arg::new("users-path")
                .long("users-path")
                .help("Path of the identity endpoint")
                .default_value(DEFAULT_USERS_PATH)
                .env("RMGATE_USERS_PATH")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("30")
                .env("RMGATE_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .help("Session file, defaults to <config dir>/rmgate/session.json")
                .env("RMGATE_STORE")
                .global(true),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Log request/response pairs (never the password)")
                .env("RMGATE_DEBUG")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .help("Emit logs as JSON lines")
                .env("RMGATE_LOG_JSON")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("RMGATE_LOG_LEVEL")
                .global(true)
                .action(ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommand(
            Command::new("login")
                .about("Check credentials against RM and store the session")
                .arg(
                    Arg::new("username")
                        .short('u')
                        .long("username")
                        .help("RM username, falls back to the remembered one")
                        .env("RMGATE_USERNAME"),
                )
                .arg(
                    Arg::new("password")
                        .short('p')
                        .long("password")
                        .help("RM password")
                        .env("RMGATE_PASSWORD")
                        .hide_env_values(true)
                        .required(true),
                )
                .arg(
                    Arg::new("remember")
                        .long("remember")
                        .help("Remember the username for the next login")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("logout").about("Remove the stored session"))
        .subcommand(Command::new("status").about("Show the session state and the route it resolves to"))
        .subcommand(Command::new("whoami").about("Fetch the profile of the stored user from RM"))
}
