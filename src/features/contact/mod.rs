//! Contact form: a message to the admins with up to three small
//! attachments, sent as `multipart/form-data`.

pub mod form;

use crate::api::{ApiClient, ApiError};
use reqwest::multipart::{Form, Part};
use tracing::{info, instrument};

pub use form::{Attachment, ContactForm, Rejected};

/// Validates and sends the form.
///
/// # Errors
/// Returns `ApiError::Validation` before any request when the form is
/// invalid, otherwise the request error.
#[instrument(skip_all, fields(attachments = form.attachments().len()))]
pub async fn send(api: &ApiClient, form: &ContactForm) -> Result<(), ApiError> {
    form.validate()?;

    let mut body = Form::new()
        .text("subject", form.subject.trim().to_string())
        .text("message", form.message.trim().to_string());
    for attachment in form.attachments() {
        body = body.part(
            "files",
            Part::bytes(attachment.bytes.clone()).file_name(attachment.name.clone()),
        );
    }

    api.post_multipart("/contact/", body).await?;
    info!("contact message sent");
    Ok(())
}
