use crate::{
    cli::actions::{failure, redirect_message, signed_in, AccountAction},
    features::{
        auth::{valid_email, LoginOutcome, Session, TokenStore, VerificationCode},
        tunnels::dashboard::beta_badge,
    },
};
use anyhow::{anyhow, bail, Result};

fn checked_email(email: &str) -> Result<&str> {
    let email = email.trim();
    if !valid_email(email) {
        bail!("Invalid email address: {email}");
    }
    Ok(email)
}

/// Accepts a typed code or pasted text containing one.
fn parse_code(input: &str) -> Result<VerificationCode> {
    VerificationCode::parse(input)
        .ok()
        .or_else(|| VerificationCode::from_pasted(input))
        .ok_or_else(|| anyhow!("The code must be 6 digits"))
}

/// Handle account actions
pub async fn handle<S: TokenStore>(action: AccountAction, session: &mut Session<S>) -> Result<()> {
    match action {
        AccountAction::Register { email } => {
            let email = checked_email(&email)?;
            session
                .register(email)
                .await
                .map_err(failure("Registration failed"))?;
            println!("Account created, a code and your password were sent to {email}.");
            println!("Run `homeaccess verify {email} <code>` to activate it.");
        }

        AccountAction::Verify { email, code } => {
            let email = checked_email(&email)?;
            let code = parse_code(&code)?;
            session
                .verify(email, &code)
                .await
                .map_err(failure("Invalid code"))?;
            println!("Email verified, signed in as {email}.");
        }

        AccountAction::ResendCode { email } => {
            let email = checked_email(&email)?;
            session
                .resend_code(email)
                .await
                .map_err(failure("Could not resend the code"))?;
            println!("A new code was sent to {email}.");
        }

        AccountAction::Login { email, password } => {
            let email = checked_email(&email)?;
            match session
                .login(email, &password)
                .await
                .map_err(failure("Invalid credentials"))?
            {
                LoginOutcome::Authenticated(_) => println!("Signed in as {email}."),
                LoginOutcome::NeedsVerification(route) => println!("{}", redirect_message(&route)),
            }
        }

        AccountAction::ForgotPassword { email } => {
            let email = checked_email(&email)?;
            session
                .forgot_password(email)
                .await
                .map_err(failure("Could not reset the password"))?;
            println!("If {email} has an account, a new password is on its way.");
        }

        AccountAction::Logout => {
            session.logout()?;
            println!("Signed out.");
        }

        AccountAction::Whoami => {
            signed_in(session).await?;
            if let Some(user) = session.user() {
                println!("{}", user.email);
                println!("tunnels: {}/{}", user.tunnel_count, user.max_tunnels);
                if user.is_admin {
                    println!("role: admin");
                }
                if let Some(badge) = beta_badge(Some(user)) {
                    println!("{badge}");
                }
            }
        }
    }

    Ok(())
}
