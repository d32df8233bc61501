pub mod account;
pub mod admin;
pub mod support;
pub mod tunnels;

use crate::{
    api::ApiError,
    cli::globals::GlobalArgs,
    features::auth::{Session, TokenStore},
    poll::Subscription,
    routes::Route,
};
use anyhow::{anyhow, bail, Result};
use secrecy::SecretString;
use std::{io::IsTerminal, path::PathBuf, time::Duration};
use tokio::time::interval;
use uuid::Uuid;

#[derive(Debug)]
pub enum Action {
    Account(AccountAction),
    Tunnels(TunnelAction),
    Admin(AdminAction),
    Support(SupportAction),
}

#[derive(Debug)]
pub enum AccountAction {
    Register { email: String },
    Verify { email: String, code: String },
    ResendCode { email: String },
    Login { email: String, password: SecretString },
    ForgotPassword { email: String },
    Logout,
    Whoami,
}

#[derive(Debug, PartialEq, Eq)]
pub enum TunnelAction {
    List,
    Check { subdomain: String },
    Create {
        subdomain: String,
        service: String,
        port: Option<u16>,
    },
    Toggle { id: Uuid },
    Routing { id: Uuid, use_device_ip: bool },
    Delete { id: Uuid },
    Config { id: Uuid, output: Option<PathBuf> },
    Watch,
}

#[derive(Debug, PartialEq, Eq)]
pub enum AdminAction {
    Users,
    Tunnels,
    Ban { id: Uuid },
    Quota { id: Uuid, max_tunnels: u32 },
    Beta { id: Uuid, enabled: bool },
    DeleteUser { id: Uuid },
    ToggleTunnel { id: Uuid },
    Activity {
        limit: u32,
        offset: u32,
        search: Option<String>,
    },
    Watch,
}

#[derive(Debug, PartialEq, Eq)]
pub enum SupportAction {
    Contact {
        subject: String,
        message: String,
        files: Vec<PathBuf>,
    },
    Donate { amount: String },
}

/// Runs an action against the configured backend.
///
/// # Errors
/// Returns the action's failure with context for the user.
pub async fn handle(action: Action, globals: &GlobalArgs) -> Result<()> {
    let mut session = globals.session()?;

    match action {
        Action::Account(action) => account::handle(action, &mut session).await,
        Action::Tunnels(action) => tunnels::handle(action, &mut session).await,
        Action::Admin(action) => admin::handle(action, &mut session).await,
        Action::Support(action) => support::handle(action, &mut session).await,
    }
}

/// Loads the profile and refuses to continue without one.
pub(crate) async fn signed_in<S: TokenStore>(session: &mut Session<S>) -> Result<()> {
    session.refresh_user().await?;
    if let Err(route) = session.require_user() {
        bail!(redirect_message(&route));
    }
    Ok(())
}

/// Redraws `frame` whenever the subscription publishes and, on a terminal,
/// once per second so uptimes keep moving. Returns on Ctrl-C.
pub(crate) async fn live<T, D>(
    status: &mut Subscription<T>,
    state: &mut D,
    apply: impl Fn(&mut D, T),
    frame: impl Fn(&D) -> String,
) -> Result<()>
where
    T: Clone + Send + Sync + 'static,
{
    // Piped output only gets a frame per status update.
    let terminal = std::io::stdout().is_terminal();
    let mut redraw = interval(Duration::from_secs(1));
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            update = status.changed() => match update {
                Some(value) => apply(state, value),
                None => break,
            },
            _ = redraw.tick(), if terminal => {}
            _ = &mut ctrl_c => break,
        }

        if terminal {
            print!("\x1b[2J\x1b[H");
        }
        print!("{}", frame(state));
    }

    status.cancel();
    Ok(())
}

/// Maps a request failure to what the user should read: local validation
/// text or the server `detail` as is, anything else under `fallback`.
pub(crate) fn failure(fallback: &'static str) -> impl FnOnce(ApiError) -> anyhow::Error {
    move |err| {
        if matches!(err, ApiError::Validation(_)) || err.detail().is_some() {
            anyhow!(err.user_message(fallback))
        } else {
            anyhow::Error::new(err).context(fallback)
        }
    }
}

/// What a redirect means on the command line.
pub(crate) fn redirect_message(route: &Route) -> String {
    match route {
        Route::Login => "Not signed in, run `homeaccess login <email>` first".to_string(),
        Route::Verify { email } => {
            format!("Email not verified, run `homeaccess verify {email} <code>`")
        }
        Route::Dashboard => "This command needs an admin account".to_string(),
        other => format!("Redirected to {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redirect_messages_name_the_next_command() {
        assert!(redirect_message(&Route::Login).contains("homeaccess login"));
        assert!(redirect_message(&Route::Verify {
            email: "jo@example.com".to_string()
        })
        .contains("homeaccess verify jo@example.com"));
        assert!(redirect_message(&Route::Dashboard).contains("admin"));
    }

    #[test]
    fn failure_prefers_server_detail() {
        let err = failure("Failed to create tunnel")(ApiError::Http {
            status: 409,
            message: "conflict".to_string(),
            detail: Some("Subdomain already taken".to_string()),
        });
        assert_eq!(err.to_string(), "Subdomain already taken");

        let err = failure("Failed to create tunnel")(ApiError::Network("refused".to_string()));
        assert_eq!(err.to_string(), "Failed to create tunnel");
        assert!(format!("{err:#}").contains("refused"));
    }
}
