use crate::{
    api::{ApiClient, ApiError},
    config::AppConfig,
    features::auth::{FileTokenStore, Session},
};

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct GlobalArgs {
    pub config: AppConfig,
}

impl GlobalArgs {
    #[must_use]
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Opens the session backed by the configured token file.
    ///
    /// # Errors
    /// Returns an `ApiError` for an invalid API URL or an unreadable token
    /// file.
    pub fn session(&self) -> Result<Session<FileTokenStore>, ApiError> {
        let api = ApiClient::new(&self.config)?;
        Session::start(api, FileTokenStore::new(&self.config.token_file))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use std::time::Duration;

    #[test]
    fn test_session_uses_configured_paths() {
        let dir = tempfile::tempdir().unwrap();
        let token_file = dir.path().join("session.json");
        std::fs::write(&token_file, r#"{"token":"abc"}"#).unwrap();

        let globals = GlobalArgs::new(AppConfig::load(Overrides {
            api_base_url: Some("http://127.0.0.1:9".to_string()),
            token_file: Some(token_file.display().to_string()),
            timeout_secs: Some(3),
        }));
        assert_eq!(globals.config.timeout, Duration::from_secs(3));

        let session = globals.session().unwrap();
        assert!(session.has_token());
        assert_eq!(session.api().base_url(), "http://127.0.0.1:9");
    }

    #[test]
    fn test_bad_url_is_rejected() {
        let globals = GlobalArgs::new(AppConfig::load(Overrides {
            api_base_url: Some("ftp://example.com".to_string()),
            ..Overrides::default()
        }));
        assert!(globals.session().is_err());
    }
}
