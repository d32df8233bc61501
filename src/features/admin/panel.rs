//! Admin panel state: every user and tunnel on the server plus the global
//! status map. Mutations refetch what they touched.

use crate::{
    api::{ApiClient, ApiError},
    features::{
        admin::{
            client,
            types::{AdminTunnel, AdminUser, AdminUserUpdate},
        },
        tunnels::{
            card::{uptime_label, UptimeStyle},
            types::{PeerStatus, StatusMap},
        },
    },
};
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Clone, Debug, Default)]
pub struct AdminPanel {
    users: Vec<AdminUser>,
    tunnels: Vec<AdminTunnel>,
    status: StatusMap,
}

impl AdminPanel {
    /// # Errors
    /// Returns the first failing request's `ApiError`.
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        let (users, tunnels, status) = tokio::try_join!(
            client::list_users(api),
            client::list_tunnels(api),
            client::fetch_status(api)
        )?;
        Ok(Self {
            users,
            tunnels,
            status,
        })
    }

    #[must_use]
    pub fn users(&self) -> &[AdminUser] {
        &self.users
    }

    #[must_use]
    pub fn tunnels(&self) -> &[AdminTunnel] {
        &self.tunnels
    }

    pub fn set_status(&mut self, status: StatusMap) {
        self.status = status;
    }

    #[must_use]
    pub fn status_of(&self, tunnel: Uuid) -> PeerStatus {
        self.status.get(&tunnel).copied().unwrap_or_default()
    }

    /// Tunnels grouped by owner, owners in order of first appearance.
    #[must_use]
    pub fn tunnels_by_user(&self) -> Vec<(Uuid, Vec<&AdminTunnel>)> {
        let mut groups: Vec<(Uuid, Vec<&AdminTunnel>)> = Vec::new();
        for tunnel in &self.tunnels {
            match groups.iter_mut().find(|(owner, _)| *owner == tunnel.user_id) {
                Some((_, owned)) => owned.push(tunnel),
                None => groups.push((tunnel.user_id, vec![tunnel])),
            }
        }
        groups
    }

    #[must_use]
    pub fn tunnels_of(&self, user: Uuid) -> Vec<&AdminTunnel> {
        self.tunnels
            .iter()
            .filter(|tunnel| tunnel.user_id == user)
            .collect()
    }

    #[must_use]
    pub fn connected_count(&self, user: Uuid) -> usize {
        self.tunnels_of(user)
            .into_iter()
            .filter(|tunnel| self.status_of(tunnel.id).connected)
            .count()
    }

    #[must_use]
    pub fn uptime(&self, tunnel: Uuid, now: i64) -> Option<String> {
        uptime_label(&self.status_of(tunnel), now, UptimeStyle::Admin)
    }

    /// Bans an active user or lifts a ban, then refetches users.
    ///
    /// # Errors
    /// `ApiError::Validation` for unknown ids and admin accounts.
    #[instrument(skip(self, api))]
    pub async fn toggle_ban(&mut self, api: &ApiClient, id: Uuid) -> Result<bool, ApiError> {
        let user = self.require_user(id)?;
        if user.is_admin {
            return Err(ApiError::Validation(
                "Admin accounts cannot be banned".to_string(),
            ));
        }
        let is_active = !user.is_active;
        let update = AdminUserUpdate {
            is_active: Some(is_active),
            ..AdminUserUpdate::default()
        };
        client::update_user(api, id, &update).await?;
        info!(%id, banned = !is_active, "user ban toggled");
        self.refresh_users(api).await?;
        Ok(is_active)
    }

    /// # Errors
    /// `ApiError::Validation` for unknown ids, otherwise the request error.
    #[instrument(skip(self, api))]
    pub async fn set_quota(
        &mut self,
        api: &ApiClient,
        id: Uuid,
        max_tunnels: u32,
    ) -> Result<(), ApiError> {
        self.require_user(id)?;
        let update = AdminUserUpdate {
            max_tunnels: Some(max_tunnels),
            ..AdminUserUpdate::default()
        };
        client::update_user(api, id, &update).await?;
        self.refresh_users(api).await
    }

    /// # Errors
    /// `ApiError::Validation` for unknown ids, otherwise the request error.
    #[instrument(skip(self, api))]
    pub async fn set_beta(
        &mut self,
        api: &ApiClient,
        id: Uuid,
        is_beta_tester: bool,
    ) -> Result<(), ApiError> {
        self.require_user(id)?;
        let update = AdminUserUpdate {
            is_beta_tester: Some(is_beta_tester),
            ..AdminUserUpdate::default()
        };
        client::update_user(api, id, &update).await?;
        self.refresh_users(api).await
    }

    /// Deletes a non-admin user, then refetches users and tunnels.
    ///
    /// # Errors
    /// `ApiError::Validation` for unknown ids and admin accounts.
    #[instrument(skip(self, api))]
    pub async fn delete_user(&mut self, api: &ApiClient, id: Uuid) -> Result<(), ApiError> {
        if self.require_user(id)?.is_admin {
            return Err(ApiError::Validation(
                "Admin accounts cannot be deleted".to_string(),
            ));
        }
        client::delete_user(api, id).await?;
        info!(%id, "user deleted");

        let (users, tunnels) = tokio::try_join!(client::list_users(api), client::list_tunnels(api))?;
        self.users = users;
        self.tunnels = tunnels;
        Ok(())
    }

    /// Flips a tunnel's `is_active`, then refetches tunnels.
    ///
    /// # Errors
    /// `ApiError::Validation` for unknown ids, otherwise the request error.
    #[instrument(skip(self, api))]
    pub async fn toggle_tunnel(&mut self, api: &ApiClient, id: Uuid) -> Result<bool, ApiError> {
        let current = self
            .tunnels
            .iter()
            .find(|tunnel| tunnel.id == id)
            .map(|tunnel| tunnel.is_active)
            .ok_or_else(|| ApiError::Validation(format!("No tunnel with id {id}")))?;

        client::set_tunnel_active(api, id, !current).await?;
        self.tunnels = client::list_tunnels(api).await?;
        Ok(!current)
    }

    async fn refresh_users(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        self.users = client::list_users(api).await?;
        Ok(())
    }

    fn require_user(&self, id: Uuid) -> Result<&AdminUser, ApiError> {
        self.users
            .iter()
            .find(|user| user.id == id)
            .ok_or_else(|| ApiError::Validation(format!("No user with id {id}")))
    }
}
