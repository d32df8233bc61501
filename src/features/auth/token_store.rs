//! Persistence for the bearer token. The token is the only client state that
//! survives between runs; it is kept under the fixed key [`TOKEN_KEY`] in a
//! small JSON document, the same shape browser local storage would hold.

use crate::api::ApiError;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};
use std::{
    fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::Mutex,
};
use tracing::debug;

/// Key the bearer token is stored under.
pub const TOKEN_KEY: &str = "token";

pub trait TokenStore: Send + Sync {
    /// Returns the persisted token, if any.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the backing store cannot be read.
    fn load(&self) -> Result<Option<SecretString>, ApiError>;

    /// Persists `token`, replacing any previous value.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the backing store cannot be written.
    fn save(&self, token: &SecretString) -> Result<(), ApiError>;

    /// Removes the persisted token. Clearing an empty store is not an error.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` if the backing store cannot be written.
    fn clear(&self) -> Result<(), ApiError>;
}

/// Token store backed by a JSON file. Other keys in the file are preserved.
#[derive(Clone, Debug)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, ApiError> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Map::new()),
            Err(err) => {
                return Err(ApiError::Storage(format!(
                    "Failed to read {}: {err}",
                    self.path.display()
                )))
            }
        };

        if contents.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => Err(ApiError::Storage(format!(
                "{} is not a JSON object",
                self.path.display()
            ))),
        }
    }

    fn write_document(&self, document: &Map<String, Value>) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| {
                ApiError::Storage(format!("Failed to create {}: {err}", parent.display()))
            })?;
        }

        let contents = serde_json::to_string_pretty(document)
            .map_err(|err| ApiError::Storage(format!("Failed to encode token file: {err}")))?;

        write_private(&self.path, contents.as_bytes())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Result<Option<SecretString>, ApiError> {
        let document = self.read_document()?;
        Ok(document
            .get(TOKEN_KEY)
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .map(|token| SecretString::from(token.to_string())))
    }

    fn save(&self, token: &SecretString) -> Result<(), ApiError> {
        let mut document = self.read_document().unwrap_or_default();
        document.insert(
            TOKEN_KEY.to_string(),
            Value::String(token.expose_secret().to_string()),
        );
        debug!("token saved to {}", self.path.display());
        self.write_document(&document)
    }

    fn clear(&self) -> Result<(), ApiError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut document = self.read_document().unwrap_or_default();
        document.remove(TOKEN_KEY);
        debug!("token cleared from {}", self.path.display());
        self.write_document(&document)
    }
}

/// Writes `contents` to a file only the owner can read. A new file is
/// created with mode 0600 and an existing one is truncated and restricted
/// before any byte lands in it.
pub(crate) fn write_private(path: &Path, contents: &[u8]) -> Result<(), ApiError> {
    let storage = |action: &str, err: std::io::Error| {
        ApiError::Storage(format!("Failed to {action} {}: {err}", path.display()))
    };

    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path).map_err(|err| storage("open", err))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(fs::Permissions::from_mode(0o600))
            .map_err(|err| storage("set permissions on", err))?;
    }

    file.write_all(contents).map_err(|err| storage("write", err))?;
    file.sync_all().map_err(|err| storage("write", err))
}

/// In-memory token store for ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, ApiError> {
        self.token
            .lock()
            .map_err(|_| ApiError::Storage("Token store lock poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Result<Option<SecretString>, ApiError> {
        Ok(self.lock()?.clone().map(SecretString::from))
    }

    fn save(&self, token: &SecretString) -> Result<(), ApiError> {
        *self.lock()? = Some(token.expose_secret().to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ApiError> {
        *self.lock()? = None;
        Ok(())
    }
}
