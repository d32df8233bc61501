//! Client configuration for the API endpoint, token storage and request
//! timeout. Values come from built-in defaults with optional overrides taken
//! from the command line or the environment. Configuration values are public;
//! the bearer token itself lives in the token store, never here.

use std::{env, path::PathBuf, time::Duration};

/// Public API endpoint used when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "https://homeaccess.site/api";
/// Request timeout applied to every API call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
/// Parent domain every tunnel subdomain lives under.
pub const TUNNEL_DOMAIN: &str = "homeaccess.site";

const TOKEN_FILE_NAME: &str = "session.json";

/// Resolved client configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_base_url: String,
    pub token_file: PathBuf,
    pub timeout: Duration,
}

/// Optional overrides, typically parsed from CLI arguments.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub token_file: Option<String>,
    pub timeout_secs: Option<u64>,
}

impl AppConfig {
    /// Builds the config from defaults and applies non-empty overrides.
    #[must_use]
    pub fn load(overrides: Overrides) -> Self {
        let mut config = Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_file: default_token_file(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        apply_overrides(&mut config, overrides);

        config
    }
}

fn apply_overrides(config: &mut AppConfig, overrides: Overrides) {
    if let Some(value) = overrides.api_base_url.as_deref().and_then(normalize_value) {
        config.api_base_url = value;
    }
    if let Some(value) = overrides.token_file.as_deref().and_then(normalize_value) {
        config.token_file = PathBuf::from(value);
    }
    if let Some(secs) = overrides.timeout_secs.filter(|secs| *secs > 0) {
        config.timeout = Duration::from_secs(secs);
    }
}

/// `$HOME/.config/homeaccess/session.json`, or a file in the working
/// directory when no home is known.
fn default_token_file() -> PathBuf {
    match env::var_os("HOME").filter(|home| !home.is_empty()) {
        Some(home) => PathBuf::from(home)
            .join(".config")
            .join(env!("CARGO_PKG_NAME"))
            .join(TOKEN_FILE_NAME),
        None => PathBuf::from(format!("{}-{TOKEN_FILE_NAME}", env!("CARGO_PKG_NAME"))),
    }
}

fn normalize_value(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
