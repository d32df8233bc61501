use crate::api::ApiError;
use std::fmt;

/// Number of digits in an email verification code.
pub const CODE_LEN: usize = 6;

/// A well-formed verification code: exactly six ASCII digits.
#[derive(Clone, PartialEq, Eq)]
pub struct VerificationCode(String);

impl VerificationCode {
    /// Validates typed input.
    ///
    /// # Errors
    /// Returns `ApiError::Validation` unless the input is six digits.
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        let trimmed = input.trim();
        if trimmed.len() == CODE_LEN && trimmed.chars().all(|c| c.is_ascii_digit()) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(ApiError::Validation(format!(
                "The verification code must be {CODE_LEN} digits"
            )))
        }
    }

    /// Normalises pasted text: non-digits are dropped and the first six
    /// digits kept. Yields a code only when six digits remain, which is
    /// what triggers an automatic submit.
    #[must_use]
    pub fn from_pasted(text: &str) -> Option<Self> {
        let digits: String = text
            .chars()
            .filter(char::is_ascii_digit)
            .take(CODE_LEN)
            .collect();
        (digits.len() == CODE_LEN).then_some(Self(digits))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Codes are short-lived credentials.
impl fmt::Debug for VerificationCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("VerificationCode(***)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_six_digits() {
        let code = VerificationCode::parse(" 012345 ");
        assert_eq!(code.map(|c| c.as_str().to_string()).ok(), Some("012345".to_string()));
    }

    #[test]
    fn parse_rejects_wrong_shapes() {
        for input in ["", "12345", "1234567", "12a456", "１２３４５６"] {
            assert!(VerificationCode::parse(input).is_err(), "{input} should be rejected");
        }
    }

    #[test]
    fn pasted_text_is_normalised() {
        let code = VerificationCode::from_pasted("Code: 123-456");
        assert_eq!(code.map(|c| c.as_str().to_string()), Some("123456".to_string()));

        let code = VerificationCode::from_pasted("1234567890");
        assert_eq!(code.map(|c| c.as_str().to_string()), Some("123456".to_string()));
    }

    #[test]
    fn short_paste_does_not_submit() {
        assert!(VerificationCode::from_pasted("12 34").is_none());
    }

    #[test]
    fn debug_hides_digits() {
        let code = VerificationCode::from_pasted("123456");
        assert_eq!(format!("{code:?}"), "Some(VerificationCode(***))");
    }
}
