use crate::api::ApiError;
use std::{
    fmt,
    path::{Path, PathBuf},
};
use tokio::io::AsyncReadExt;

pub const MAX_SUBJECT_CHARS: usize = 200;
pub const MAX_MESSAGE_CHARS: usize = 5000;
pub const MAX_FILES: usize = 3;
pub const MAX_FILE_BYTES: usize = 1_000_000;

#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("name", &self.name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Attachment {
    #[must_use]
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    /// Reads a file from disk, named after its final path component. At most
    /// one byte past [`MAX_FILE_BYTES`] is read, enough for
    /// [`ContactForm::add_files`] to refuse an oversized file.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` when the file cannot be read.
    pub async fn read(path: &Path) -> Result<Self, ApiError> {
        let storage = |err: std::io::Error| ApiError::Storage(format!("{}: {err}", path.display()));
        let file = tokio::fs::File::open(path).await.map_err(storage)?;
        let mut bytes = Vec::new();
        file.take(MAX_FILE_BYTES as u64 + 1)
            .read_to_end(&mut bytes)
            .await
            .map_err(storage)?;
        Ok(Self {
            name: file_name(path),
            bytes,
        })
    }

    #[must_use]
    pub fn size_label(&self) -> String {
        format!("{} KB", self.bytes.len() / 1024)
    }
}

/// A file refused by [`ContactForm::add_files`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Rejected {
    pub name: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default)]
pub struct ContactForm {
    pub subject: String,
    pub message: String,
    attachments: Vec<Attachment>,
}

impl ContactForm {
    #[must_use]
    pub fn new(subject: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            message: message.into(),
            attachments: Vec::new(),
        }
    }

    #[must_use]
    pub fn attachments(&self) -> &[Attachment] {
        &self.attachments
    }

    /// Adds files in order. Oversized files are refused one by one; once the
    /// form holds the maximum, that file and every later one are refused.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = Attachment>) -> Vec<Rejected> {
        let mut rejected = Vec::new();
        let mut full = false;
        for file in files {
            if full || self.attachments.len() >= MAX_FILES {
                full = true;
                rejected.push(Rejected {
                    name: file.name,
                    reason: format!("Maximum {MAX_FILES} files"),
                });
                continue;
            }
            if file.bytes.len() > MAX_FILE_BYTES {
                rejected.push(Rejected {
                    reason: format!("File \"{}\" exceeds 1 MB", file.name),
                    name: file.name,
                });
                continue;
            }
            self.attachments.push(file);
        }
        rejected
    }

    /// Reads and adds files from disk with the same rules as
    /// [`add_files`](Self::add_files). Paths past the file limit are refused
    /// without being opened.
    ///
    /// # Errors
    /// Returns `ApiError::Storage` when a file within the limit cannot be read.
    pub async fn attach_paths(&mut self, paths: &[PathBuf]) -> Result<Vec<Rejected>, ApiError> {
        let mut rejected = Vec::new();
        for path in paths {
            if self.attachments.len() >= MAX_FILES {
                rejected.push(Rejected {
                    name: file_name(path),
                    reason: format!("Maximum {MAX_FILES} files"),
                });
                continue;
            }
            let file = Attachment::read(path).await?;
            rejected.extend(self.add_files([file]));
        }
        Ok(rejected)
    }

    /// Removes the attachment at `index`, if any.
    pub fn remove(&mut self, index: usize) -> Option<Attachment> {
        (index < self.attachments.len()).then(|| self.attachments.remove(index))
    }

    /// # Errors
    /// Returns `ApiError::Validation` for an empty or overlong subject or
    /// message.
    pub fn validate(&self) -> Result<(), ApiError> {
        check_text("Subject", &self.subject, MAX_SUBJECT_CHARS)?;
        check_text("Message", &self.message, MAX_MESSAGE_CHARS)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "file".to_string(), |name| name.to_string_lossy().into_owned())
}

fn check_text(label: &str, value: &str, max: usize) -> Result<(), ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::Validation(format!("{label} is required")));
    }
    if value.chars().count() > max {
        return Err(ApiError::Validation(format!(
            "{label} must be at most {max} characters"
        )));
    }
    Ok(())
}
