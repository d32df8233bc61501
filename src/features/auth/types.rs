//! Request and response types for auth API calls. Login payloads carry the
//! password and responses carry the bearer token, so none of these may be
//! logged.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisteredUser {
    pub id: Uuid,
    pub email: String,
    pub created_at: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyRequest {
    pub email: String,
    pub code: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

/// Borrowed so the password is only exposed for the duration of the call.
#[derive(Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

/// Current user as returned by `/auth/me`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_beta_tester: bool,
    pub max_tunnels: u32,
    #[serde(default)]
    pub tunnel_count: u32,
}

impl UserProfile {
    /// Whether the quota leaves room for another tunnel.
    #[must_use]
    pub const fn can_create_tunnel(&self) -> bool {
        self.tunnel_count < self.max_tunnels
    }
}
