//! Auth feature covering registration, email-code verification, login,
//! password reset and the session lifecycle. Tokens and passwords cross this
//! module, so nothing here logs request payloads.
//!
//! Flow overview: register posts an email and the backend mails a code plus
//! a generated password. Verify submits the code and returns the first
//! access token. Login exchanges email and password for a token, or points
//! back to verification while the account is unverified.

pub mod client;
pub mod code;
pub mod session;
pub mod token_store;
pub mod types;

use regex::Regex;

pub use code::VerificationCode;
pub use session::{LoginOutcome, Session};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

/// Loose email shape check before anything is sent; the backend validates
/// for real.
#[must_use]
pub fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|re| re.is_match(email.trim()))
}

#[cfg(test)]
mod tests {
    use super::valid_email;

    #[test]
    fn email_shape() {
        assert!(valid_email("jo@example.com"));
        assert!(valid_email(" jo+home@mail.example.org "));
        assert!(!valid_email("jo@localhost"));
        assert!(!valid_email("jo example@x.com"));
        assert!(!valid_email(""));
    }
}
