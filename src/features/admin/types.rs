use crate::api::ApiError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    /// `false` means banned.
    pub is_active: bool,
    pub is_verified: bool,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub is_beta_tester: bool,
    pub max_tunnels: u32,
    #[serde(default)]
    pub tunnel_count: u32,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTunnel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_email: String,
    pub subdomain: String,
    pub target_port: u16,
    #[serde(default)]
    pub service_type: Option<String>,
    pub vpn_ip: String,
    pub device_ip: String,
    #[serde(default)]
    pub use_device_ip: bool,
    pub is_active: bool,
    pub full_domain: String,
    pub created_at: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: Uuid,
    pub user_email: String,
    pub action: String,
    #[serde(default)]
    pub detail: Option<String>,
    pub created_at: String,
}

/// Partial user update; unset fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_beta_tester: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tunnels: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminTunnelUpdate {
    pub is_active: bool,
}

pub const ACTIVITY_DEFAULT_LIMIT: u32 = 50;
pub const ACTIVITY_MAX_LIMIT: u32 = 200;
pub const ACTIVITY_MAX_SEARCH: usize = 200;

/// Query string of `GET /admin/activity`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivityQuery {
    pub limit: u32,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl Default for ActivityQuery {
    fn default() -> Self {
        Self {
            limit: ACTIVITY_DEFAULT_LIMIT,
            offset: 0,
            search: None,
        }
    }
}

impl ActivityQuery {
    /// Builds a query, rejecting out-of-range values instead of clamping.
    ///
    /// # Errors
    /// Returns `ApiError::Validation` for a limit outside `1..=200` or a
    /// search term longer than 200 characters.
    pub fn new(limit: u32, offset: u32, search: Option<&str>) -> Result<Self, ApiError> {
        if !(1..=ACTIVITY_MAX_LIMIT).contains(&limit) {
            return Err(ApiError::Validation(format!(
                "limit must be between 1 and {ACTIVITY_MAX_LIMIT}"
            )));
        }
        let search = search.map(str::trim).filter(|term| !term.is_empty());
        if search.is_some_and(|term| term.chars().count() > ACTIVITY_MAX_SEARCH) {
            return Err(ApiError::Validation(format!(
                "search must be at most {ACTIVITY_MAX_SEARCH} characters"
            )));
        }

        Ok(Self {
            limit,
            offset,
            search: search.map(str::to_string),
        })
    }

    /// Query for the following page.
    #[must_use]
    pub fn next_page(&self) -> Self {
        Self {
            offset: self.offset.saturating_add(self.limit),
            ..self.clone()
        }
    }
}
