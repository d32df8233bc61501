pub mod account;
pub mod admin;
pub mod support;
pub mod tunnels;

use crate::GIT_COMMIT_HASH;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            if parsed <= 4 {
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

/// `--help` and `--version` get the commit hash appended.
fn long_version() -> String {
    format!("{} - {GIT_COMMIT_HASH}", env!("CARGO_PKG_VERSION"))
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("homeaccess")
        .about("Expose home services through WireGuard tunnels")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version())
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("api-url")
                .long("api-url")
                .help("HomeAccess API base URL")
                .default_value(crate::config::DEFAULT_API_BASE_URL)
                .env("HOMEACCESS_API_URL")
                .global(true),
        )
        .arg(
            Arg::new("token-file")
                .long("token-file")
                .help("Where the session token is stored (default: ~/.config/homeaccess/session.json)")
                .env("HOMEACCESS_TOKEN_FILE")
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Request timeout in seconds")
                .default_value("10")
                .env("HOMEACCESS_TIMEOUT")
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("HOMEACCESS_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
        .subcommands(account::subcommands())
        .subcommand(tunnels::subcommand())
        .subcommand(admin::subcommand())
        .subcommands(support::subcommands())
}
