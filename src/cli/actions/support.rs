use crate::{
    cli::actions::{failure, signed_in, SupportAction},
    features::{
        auth::{Session, TokenStore},
        billing::{self, Amount},
        contact::{self, ContactForm},
    },
};
use anyhow::{bail, Result};
use secrecy::ExposeSecret;
use tracing::warn;

/// Handle contact and donation actions
pub async fn handle<S: TokenStore>(action: SupportAction, session: &mut Session<S>) -> Result<()> {
    signed_in(session).await?;

    match action {
        SupportAction::Contact {
            subject,
            message,
            files,
        } => {
            let mut form = ContactForm::new(subject, message);
            form.validate()?;

            let rejected = form.attach_paths(&files).await?;
            if !rejected.is_empty() {
                for file in &rejected {
                    warn!("{}: {}", file.name, file.reason);
                }
                bail!(
                    "{} attachment(s) refused: {}",
                    rejected.len(),
                    rejected
                        .iter()
                        .map(|file| file.reason.as_str())
                        .collect::<Vec<_>>()
                        .join("; ")
                );
            }

            contact::send(session.api(), &form)
                .await
                .map_err(failure("Failed to send the message"))?;
            println!("Message sent, thank you.");
        }

        SupportAction::Donate { amount } => {
            let amount = Amount::parse_euros(&amount)?;
            let secret = billing::checkout(session.api(), amount)
                .await
                .map_err(failure("Payment unavailable"))?;
            println!("Checkout session ready for {:.2} EUR.", f64::from(amount.cents()) / 100.0);
            println!("client_secret: {}", secret.expose_secret());
        }
    }

    Ok(())
}
