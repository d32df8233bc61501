//! Donations. The client validates the amount and asks the backend for a
//! hosted checkout session; payment itself happens in the provider's
//! widget.

use crate::api::{ApiClient, ApiError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// Suggested donation amounts in euros.
pub const SUGGESTED_EUROS: [u32; 4] = [2, 5, 10, 20];
pub const MIN_CENTS: u32 = 100;
pub const MAX_CENTS: u32 = 100_000;

/// A validated donation amount.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Amount(u32);

impl Amount {
    /// # Errors
    /// Returns `ApiError::Validation` outside 1 to 1000 euros.
    pub fn from_cents(cents: u32) -> Result<Self, ApiError> {
        if (MIN_CENTS..=MAX_CENTS).contains(&cents) {
            Ok(Self(cents))
        } else {
            Err(ApiError::Validation(
                "The amount must be between 1 and 1000 euros".to_string(),
            ))
        }
    }

    /// Parses a euro amount typed by the user, such as `5`, `7.5` or `7,50`.
    ///
    /// # Errors
    /// Returns `ApiError::Validation` for unparsable or out-of-range input.
    pub fn parse_euros(input: &str) -> Result<Self, ApiError> {
        let invalid = || ApiError::Validation(format!("Invalid amount: {}", input.trim()));
        let normalized = input.trim().replace(',', ".");
        let (whole, fraction) = normalized
            .split_once('.')
            .unwrap_or((normalized.as_str(), ""));
        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if whole.is_empty() || fraction.len() > 2 || !digits(whole) || !digits(fraction) {
            return Err(invalid());
        }
        let euros: u32 = whole.parse().map_err(|_| invalid())?;
        let cents: u32 = if fraction.is_empty() {
            0
        } else {
            format!("{fraction:0<2}").parse().map_err(|_| invalid())?
        };
        if euros < 1 {
            return Err(ApiError::Validation(
                "The minimum donation is 1 euro".to_string(),
            ));
        }
        euros
            .checked_mul(100)
            .and_then(|total| total.checked_add(cents))
            .ok_or_else(invalid)
            .and_then(Self::from_cents)
    }

    #[must_use]
    pub const fn cents(self) -> u32 {
        self.0
    }
}

#[derive(Debug, Serialize)]
struct CheckoutRequest {
    amount: u32,
}

#[derive(Deserialize)]
struct CheckoutResponse {
    client_secret: String,
}

/// Creates a hosted checkout session and returns its client secret.
///
/// # Errors
/// Returns the request error, e.g. 503 when payments are not configured.
#[instrument(skip(api))]
pub async fn checkout(api: &ApiClient, amount: Amount) -> Result<SecretString, ApiError> {
    let response: CheckoutResponse = api
        .post_json(
            "/billing/checkout",
            &CheckoutRequest {
                amount: amount.cents(),
            },
        )
        .await?;
    info!(cents = amount.cents(), "checkout session created");
    Ok(SecretString::from(response.client_secret))
}
