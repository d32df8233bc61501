//! Client wrappers for the `/auth` endpoints. These helpers keep endpoint
//! paths in one place; token persistence is the session's job, not theirs.

use crate::{
    api::{ApiClient, ApiError},
    features::auth::types::{
        EmailRequest, LoginRequest, RegisterRequest, RegisteredUser, TokenResponse, UserProfile,
        VerifyRequest,
    },
};
use secrecy::{ExposeSecret, SecretString};
use tracing::instrument;

/// Creates a pending account; the backend emails a code and a password.
#[instrument(skip_all)]
pub async fn register(api: &ApiClient, email: &str) -> Result<RegisteredUser, ApiError> {
    let request = RegisterRequest {
        email: email.to_string(),
    };
    api.post_json("/auth/register", &request).await
}

/// Submits the 6-digit code and returns the access token.
#[instrument(skip_all)]
pub async fn verify(api: &ApiClient, email: &str, code: &str) -> Result<TokenResponse, ApiError> {
    let request = VerifyRequest {
        email: email.to_string(),
        code: code.to_string(),
    };
    api.post_json("/auth/verify", &request).await
}

/// Reissues a verification code. The answer never reveals account existence.
#[instrument(skip_all)]
pub async fn resend_code(api: &ApiClient, email: &str) -> Result<(), ApiError> {
    let request = EmailRequest {
        email: email.to_string(),
    };
    api.post_json_empty("/auth/resend-code", &request).await
}

/// Exchanges credentials for an access token.
#[instrument(skip_all)]
pub async fn login(
    api: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<TokenResponse, ApiError> {
    let request = LoginRequest {
        email,
        password: password.expose_secret(),
    };
    api.post_json("/auth/login", &request).await
}

/// Fetches the profile behind the current bearer token.
pub async fn fetch_me(api: &ApiClient) -> Result<UserProfile, ApiError> {
    api.get_json("/auth/me").await
}

/// Triggers a password reset email.
#[instrument(skip_all)]
pub async fn forgot_password(api: &ApiClient, email: &str) -> Result<(), ApiError> {
    let request = EmailRequest {
        email: email.to_string(),
    };
    api.post_json_empty("/auth/forgot-password", &request).await
}
