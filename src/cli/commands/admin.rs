use crate::features::admin::types::{ACTIVITY_DEFAULT_LIMIT, ACTIVITY_MAX_LIMIT};
use clap::{Arg, Command};
use uuid::Uuid;

fn id(help: &'static str) -> Arg {
    Arg::new("id")
        .help(help)
        .required(true)
        .value_parser(clap::value_parser!(Uuid))
}

pub fn subcommand() -> Command {
    Command::new("admin")
        .about("Administration, admin accounts only")
        .subcommand_required(true)
        .subcommand(Command::new("users").about("List users with their tunnels"))
        .subcommand(Command::new("tunnels").about("List every tunnel"))
        .subcommand(
            Command::new("ban")
                .about("Ban a user, or lift the ban")
                .arg(id("User id")),
        )
        .subcommand(
            Command::new("quota")
                .about("Set a user's tunnel quota")
                .arg(id("User id"))
                .arg(
                    Arg::new("max")
                        .required(true)
                        .value_parser(clap::value_parser!(u32)),
                ),
        )
        .subcommand(
            Command::new("beta")
                .about("Grant or revoke beta-tester status")
                .arg(id("User id"))
                .arg(
                    Arg::new("enabled")
                        .required(true)
                        .value_parser(clap::value_parser!(bool)),
                ),
        )
        .subcommand(
            Command::new("delete-user")
                .about("Delete a user and their tunnels")
                .arg(id("User id")),
        )
        .subcommand(
            Command::new("toggle-tunnel")
                .about("Enable or disable any tunnel")
                .arg(id("Tunnel id")),
        )
        .subcommand(
            Command::new("activity")
                .about("Show the activity log")
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .default_value(ACTIVITY_DEFAULT_LIMIT.to_string())
                        .value_parser(
                            clap::value_parser!(u32).range(1..=i64::from(ACTIVITY_MAX_LIMIT)),
                        ),
                )
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .default_value("0")
                        .value_parser(clap::value_parser!(u32)),
                )
                .arg(Arg::new("search").long("search").short('s')),
        )
        .subcommand(Command::new("watch").about("Live tunnel status for all users"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::cli::commands::new;

    #[test]
    fn activity_defaults() {
        let matches = new().get_matches_from(["homeaccess", "admin", "activity"]);
        let activity = matches
            .subcommand_matches("admin")
            .and_then(|m| m.subcommand_matches("activity"))
            .unwrap();
        assert_eq!(activity.get_one::<u32>("limit").copied(), Some(50));
        assert_eq!(activity.get_one::<u32>("offset").copied(), Some(0));
        assert_eq!(activity.get_one::<String>("search"), None);
    }

    #[test]
    fn activity_limit_is_bounded() {
        assert!(new()
            .try_get_matches_from(["homeaccess", "admin", "activity", "--limit", "201"])
            .is_err());
        assert!(new()
            .try_get_matches_from(["homeaccess", "admin", "activity", "--limit", "0"])
            .is_err());
    }

    #[test]
    fn beta_takes_a_bool() {
        let id = "c3a1f9d0-6b2e-4f7a-9c85-1e4d7b0a2f36";
        assert!(new()
            .try_get_matches_from(["homeaccess", "admin", "beta", id, "yes"])
            .is_err());
        assert!(new()
            .try_get_matches_from(["homeaccess", "admin", "beta", id, "true"])
            .is_ok());
    }
}
