//! Client helpers for the `/tunnels` endpoints. Authorization is enforced by
//! the backend; every call here runs under the session's bearer token.

use crate::{
    api::{ApiClient, ApiError},
    features::tunnels::types::{
        CreateTunnelRequest, StatusMap, SubdomainCheck, Tunnel, TunnelUpdate,
    },
};
use tracing::instrument;
use uuid::Uuid;

/// Lists the caller's tunnels, newest first.
pub async fn list_tunnels(api: &ApiClient) -> Result<Vec<Tunnel>, ApiError> {
    api.get_json("/tunnels/").await
}

#[instrument(skip(api))]
pub async fn create_tunnel(
    api: &ApiClient,
    request: &CreateTunnelRequest,
) -> Result<Tunnel, ApiError> {
    api.post_json("/tunnels/", request).await
}

/// Asks whether `subdomain` is free. The backend lowercases and also
/// reports reserved names as taken.
pub async fn check_subdomain(api: &ApiClient, subdomain: &str) -> Result<SubdomainCheck, ApiError> {
    let subdomain = subdomain.to_lowercase();
    api.get_json_with_query("/tunnels/check-subdomain", &[("subdomain", subdomain.as_str())])
        .await
}

/// Connection status of the caller's tunnels.
pub async fn fetch_status(api: &ApiClient) -> Result<StatusMap, ApiError> {
    api.get_json("/tunnels/status").await
}

#[instrument(skip(api))]
pub async fn update_tunnel(
    api: &ApiClient,
    id: Uuid,
    update: &TunnelUpdate,
) -> Result<Tunnel, ApiError> {
    api.patch_json(&format!("/tunnels/{id}"), update).await
}

#[instrument(skip(api))]
pub async fn delete_tunnel(api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    api.delete(&format!("/tunnels/{id}")).await
}

/// Downloads the WireGuard client configuration. It embeds the peer's
/// private key and must not be logged.
pub async fn download_config(api: &ApiClient, id: Uuid) -> Result<String, ApiError> {
    api.get_text(&format!("/tunnels/{id}/config")).await
}
