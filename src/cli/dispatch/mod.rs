use crate::{
    cli::{
        actions::{AccountAction, Action, AdminAction, SupportAction, TunnelAction},
        globals::GlobalArgs,
    },
    config::{AppConfig, Overrides},
    features::admin::types::ACTIVITY_DEFAULT_LIMIT,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::path::PathBuf;
use uuid::Uuid;

/// Builds the shared settings from the global arguments.
#[must_use]
pub fn globals(matches: &ArgMatches) -> GlobalArgs {
    GlobalArgs::new(AppConfig::load(Overrides {
        api_base_url: matches.get_one::<String>("api-url").cloned(),
        token_file: matches.get_one::<String>("token-file").cloned(),
        timeout_secs: matches.get_one::<u64>("timeout").copied(),
    }))
}

fn string(matches: &ArgMatches, name: &str) -> Result<String> {
    matches
        .get_one::<String>(name)
        .cloned()
        .ok_or_else(|| anyhow!("missing required argument: {name}"))
}

fn id(matches: &ArgMatches) -> Result<Uuid> {
    matches
        .get_one::<Uuid>("id")
        .copied()
        .context("missing required argument: id")
}

/// Maps parsed arguments to the action to run.
///
/// # Errors
/// Returns an error for an unknown subcommand or a missing argument.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let (name, sub) = matches.subcommand().context("missing subcommand")?;

    let action = match name {
        "register" => Action::Account(AccountAction::Register {
            email: string(sub, "email")?,
        }),
        "verify" => Action::Account(AccountAction::Verify {
            email: string(sub, "email")?,
            code: string(sub, "code")?,
        }),
        "resend-code" => Action::Account(AccountAction::ResendCode {
            email: string(sub, "email")?,
        }),
        "login" => Action::Account(AccountAction::Login {
            email: string(sub, "email")?,
            password: SecretString::from(string(sub, "password")?),
        }),
        "forgot-password" => Action::Account(AccountAction::ForgotPassword {
            email: string(sub, "email")?,
        }),
        "logout" => Action::Account(AccountAction::Logout),
        "whoami" => Action::Account(AccountAction::Whoami),
        "tunnels" => Action::Tunnels(tunnel_action(sub)?),
        "admin" => Action::Admin(admin_action(sub)?),
        "contact" => Action::Support(SupportAction::Contact {
            subject: string(sub, "subject")?,
            message: string(sub, "message")?,
            files: sub
                .get_many::<PathBuf>("file")
                .map(|files| files.cloned().collect())
                .unwrap_or_default(),
        }),
        "donate" => Action::Support(SupportAction::Donate {
            amount: string(sub, "amount")?,
        }),
        other => return Err(anyhow!("unknown command: {other}")),
    };

    Ok(action)
}

fn tunnel_action(matches: &ArgMatches) -> Result<TunnelAction> {
    let (name, sub) = matches.subcommand().context("missing tunnels subcommand")?;

    Ok(match name {
        "list" => TunnelAction::List,
        "check" => TunnelAction::Check {
            subdomain: string(sub, "subdomain")?,
        },
        "create" => TunnelAction::Create {
            subdomain: string(sub, "subdomain")?,
            service: string(sub, "service")?,
            port: sub.get_one::<u16>("port").copied(),
        },
        "toggle" => TunnelAction::Toggle { id: id(sub)? },
        "routing" => TunnelAction::Routing {
            id: id(sub)?,
            use_device_ip: sub.get_flag("device"),
        },
        "delete" => TunnelAction::Delete { id: id(sub)? },
        "config" => TunnelAction::Config {
            id: id(sub)?,
            output: sub.get_one::<String>("output").map(PathBuf::from),
        },
        "watch" => TunnelAction::Watch,
        other => return Err(anyhow!("unknown tunnels command: {other}")),
    })
}

fn admin_action(matches: &ArgMatches) -> Result<AdminAction> {
    let (name, sub) = matches.subcommand().context("missing admin subcommand")?;

    Ok(match name {
        "users" => AdminAction::Users,
        "tunnels" => AdminAction::Tunnels,
        "ban" => AdminAction::Ban { id: id(sub)? },
        "quota" => AdminAction::Quota {
            id: id(sub)?,
            max_tunnels: sub.get_one::<u32>("max").copied().context("missing max")?,
        },
        "beta" => AdminAction::Beta {
            id: id(sub)?,
            enabled: sub
                .get_one::<bool>("enabled")
                .copied()
                .context("missing enabled")?,
        },
        "delete-user" => AdminAction::DeleteUser { id: id(sub)? },
        "toggle-tunnel" => AdminAction::ToggleTunnel { id: id(sub)? },
        "activity" => AdminAction::Activity {
            limit: sub
                .get_one::<u32>("limit")
                .copied()
                .unwrap_or(ACTIVITY_DEFAULT_LIMIT),
            offset: sub.get_one::<u32>("offset").copied().unwrap_or(0),
            search: sub.get_one::<String>("search").cloned(),
        },
        "watch" => AdminAction::Watch,
        other => return Err(anyhow!("unknown admin command: {other}")),
    })
}
