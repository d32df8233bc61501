use crate::features::billing::SUGGESTED_EUROS;
use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;

pub fn subcommands() -> Vec<Command> {
    let suggested = SUGGESTED_EUROS
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    vec![
        Command::new("contact")
            .about("Send a message to the HomeAccess team")
            .arg(
                Arg::new("subject")
                    .long("subject")
                    .required(true),
            )
            .arg(
                Arg::new("message")
                    .long("message")
                    .short('m')
                    .required(true),
            )
            .arg(
                Arg::new("file")
                    .long("file")
                    .short('f')
                    .help("Attachment, up to 3 files of 1 MB each")
                    .action(ArgAction::Append)
                    .value_parser(clap::value_parser!(PathBuf)),
            ),
        Command::new("donate")
            .about("Support the project through the hosted checkout")
            .arg(
                Arg::new("amount")
                    .help(format!("Amount in euros, suggested: {suggested}"))
                    .required(true),
            ),
    ]
}
