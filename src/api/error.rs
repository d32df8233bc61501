use thiserror::Error;

#[derive(Clone, Debug, Error)]
pub enum ApiError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Timeout: {0}")]
    Timeout(String),
    #[error("Request failed ({status}): {message}")]
    Http {
        status: u16,
        message: String,
        detail: Option<String>,
    },
    #[error("Response error: {0}")]
    Parse(String),
    #[error("Request error: {0}")]
    Serialization(String),
    #[error("{0}")]
    Validation(String),
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// HTTP status of a failed request, if the server answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `detail` string from the server error body, when present.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// True when the backend rejected the bearer token.
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Message for the user: local validation text, then the server
    /// `detail`, then the caller's generic fallback.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Http {
                detail: Some(detail),
                ..
            } => detail.clone(),
            _ => fallback.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16, detail: Option<&str>) -> ApiError {
        ApiError::Http {
            status,
            message: "boom".to_string(),
            detail: detail.map(ToString::to_string),
        }
    }

    #[test]
    fn user_message_prefers_detail() {
        let err = http(409, Some("Subdomain already taken"));
        assert_eq!(
            err.user_message("Failed to create tunnel"),
            "Subdomain already taken"
        );
    }

    #[test]
    fn user_message_falls_back_without_detail() {
        assert_eq!(http(500, None).user_message("Invalid code"), "Invalid code");
        assert_eq!(
            ApiError::Network("refused".to_string()).user_message("Invalid code"),
            "Invalid code"
        );
    }

    #[test]
    fn validation_message_is_shown_verbatim() {
        let err = ApiError::Validation("Maximum 3 files".to_string());
        assert_eq!(err.user_message("ignored"), "Maximum 3 files");
    }

    #[test]
    fn unauthorized_covers_401_and_403() {
        assert!(http(401, None).is_unauthorized());
        assert!(http(403, None).is_unauthorized());
        assert!(!http(404, None).is_unauthorized());
        assert!(!ApiError::Timeout("slow".to_string()).is_unauthorized());
    }
}
