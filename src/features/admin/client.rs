//! `/admin` endpoints. The backend rejects non-admin tokens with 403.

use crate::{
    api::{ApiClient, ApiError},
    features::{
        admin::types::{
            ActivityEntry, ActivityQuery, AdminTunnel, AdminTunnelUpdate, AdminUser,
            AdminUserUpdate,
        },
        tunnels::types::StatusMap,
    },
};
use tracing::instrument;
use uuid::Uuid;

pub async fn list_users(api: &ApiClient) -> Result<Vec<AdminUser>, ApiError> {
    api.get_json("/admin/users").await
}

#[instrument(skip(api))]
pub async fn update_user(
    api: &ApiClient,
    id: Uuid,
    update: &AdminUserUpdate,
) -> Result<AdminUser, ApiError> {
    api.patch_json(&format!("/admin/users/{id}"), update).await
}

#[instrument(skip(api))]
pub async fn delete_user(api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
    api.delete(&format!("/admin/users/{id}")).await
}

pub async fn list_tunnels(api: &ApiClient) -> Result<Vec<AdminTunnel>, ApiError> {
    api.get_json("/admin/tunnels").await
}

#[instrument(skip(api))]
pub async fn set_tunnel_active(
    api: &ApiClient,
    id: Uuid,
    is_active: bool,
) -> Result<AdminTunnel, ApiError> {
    api.patch_json(&format!("/admin/tunnels/{id}"), &AdminTunnelUpdate { is_active })
        .await
}

/// Status of every tunnel on the server.
pub async fn fetch_status(api: &ApiClient) -> Result<StatusMap, ApiError> {
    api.get_json("/admin/tunnels/status").await
}

pub async fn activity(
    api: &ApiClient,
    query: &ActivityQuery,
) -> Result<Vec<ActivityEntry>, ApiError> {
    api.get_json_with_query("/admin/activity", query).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn activity_sends_paging_and_search() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/activity"))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "40"))
            .and(query_param("search", "nas"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        let query = ActivityQuery::new(20, 40, Some("nas")).unwrap();
        let entries = activity(&api, &query).await.unwrap();
        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn forbidden_surfaces_as_unauthorized() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/admin/users"))
            .respond_with(
                ResponseTemplate::new(403).set_body_json(serde_json::json!({ "detail": "Admin only" })),
            )
            .mount(&server)
            .await;

        let api = ApiClient::with_base_url(&server.uri(), Duration::from_secs(5)).unwrap();
        let err = list_users(&api).await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(err.detail(), Some("Admin only"));
    }
}
