//! Dashboard state: the caller's tunnels plus their live status, and the
//! mutations that refetch afterwards.

use crate::{
    api::{ApiClient, ApiError},
    features::{
        auth::{types::UserProfile, Session, TokenStore},
        tunnels::{
            card::TunnelCard,
            client,
            form::CreateTunnelForm,
            types::{StatusMap, Tunnel, TunnelUpdate},
        },
    },
};
use std::collections::HashSet;
use tracing::{info, instrument};
use uuid::Uuid;

pub const BETA_BADGE: &str = "free beta-tester account";

/// True when the profile is loaded and under its tunnel quota.
#[must_use]
pub fn can_create(user: Option<&UserProfile>) -> bool {
    user.is_some_and(UserProfile::can_create_tunnel)
}

#[must_use]
pub fn beta_badge(user: Option<&UserProfile>) -> Option<&'static str> {
    user.filter(|user| user.is_beta_tester).map(|_| BETA_BADGE)
}

#[derive(Clone, Debug, Default)]
pub struct Dashboard {
    tunnels: Vec<Tunnel>,
    status: StatusMap,
}

impl Dashboard {
    #[must_use]
    pub const fn new(tunnels: Vec<Tunnel>, status: StatusMap) -> Self {
        Self { tunnels, status }
    }

    /// Fetches the tunnel list and the status map.
    ///
    /// # Errors
    /// Returns the first failing request's `ApiError`.
    pub async fn load(api: &ApiClient) -> Result<Self, ApiError> {
        let mut dashboard = Self::default();
        dashboard.refresh(api).await?;
        Ok(dashboard)
    }

    /// One list fetch and one status fetch.
    ///
    /// # Errors
    /// Returns the first failing request's `ApiError`; state is unchanged.
    pub async fn refresh(&mut self, api: &ApiClient) -> Result<(), ApiError> {
        let (tunnels, status) = tokio::try_join!(client::list_tunnels(api), client::fetch_status(api))?;
        self.tunnels = tunnels;
        self.status = status;
        Ok(())
    }

    /// Replaces the status map with a value from the poller.
    pub fn set_status(&mut self, status: StatusMap) {
        self.status = status;
    }

    #[must_use]
    pub fn tunnels(&self) -> &[Tunnel] {
        &self.tunnels
    }

    #[must_use]
    pub const fn status(&self) -> &StatusMap {
        &self.status
    }

    #[must_use]
    pub fn find(&self, id: Uuid) -> Option<&Tunnel> {
        self.tunnels.iter().find(|tunnel| tunnel.id == id)
    }

    /// One card per tunnel id in server order; the first occurrence wins.
    #[must_use]
    pub fn cards(&self) -> Vec<TunnelCard> {
        let mut seen = HashSet::with_capacity(self.tunnels.len());
        self.tunnels
            .iter()
            .filter(|tunnel| seen.insert(tunnel.id))
            .map(|tunnel| TunnelCard::new(tunnel, self.status.get(&tunnel.id)))
            .collect()
    }

    /// Flips `is_active` and refetches.
    ///
    /// # Errors
    /// `ApiError::Validation` for an unknown id, otherwise the request error.
    #[instrument(skip(self, api))]
    pub async fn toggle(&mut self, api: &ApiClient, id: Uuid) -> Result<bool, ApiError> {
        let current = self.require(id)?.is_active;
        let update = TunnelUpdate {
            is_active: Some(!current),
            ..TunnelUpdate::default()
        };
        client::update_tunnel(api, id, &update).await?;
        self.refresh(api).await?;
        Ok(!current)
    }

    /// Routes the tunnel to its device IP (`true`) or VPN IP and refetches.
    ///
    /// # Errors
    /// `ApiError::Validation` for an unknown id, otherwise the request error.
    #[instrument(skip(self, api))]
    pub async fn set_routing(
        &mut self,
        api: &ApiClient,
        id: Uuid,
        use_device_ip: bool,
    ) -> Result<(), ApiError> {
        self.require(id)?;
        let update = TunnelUpdate {
            use_device_ip: Some(use_device_ip),
            ..TunnelUpdate::default()
        };
        client::update_tunnel(api, id, &update).await?;
        self.refresh(api).await
    }

    /// Creates a tunnel from the form, then refetches tunnels, status and
    /// the profile so the quota stays current.
    ///
    /// # Errors
    /// `ApiError::Validation` when the form is not submittable or the quota
    /// is used up, otherwise the request error.
    pub async fn create<S: TokenStore>(
        &mut self,
        session: &mut Session<S>,
        form: &CreateTunnelForm,
    ) -> Result<Tunnel, ApiError> {
        match session.user() {
            None => return Err(ApiError::Validation("Profile not loaded".to_string())),
            Some(_) if !can_create(session.user()) => {
                return Err(ApiError::Validation("Tunnel limit reached".to_string()));
            }
            Some(_) => {}
        }
        let request = form.request()?;
        let tunnel = client::create_tunnel(session.api(), &request).await?;
        info!(subdomain = %tunnel.subdomain, "tunnel created");

        self.refresh(session.api()).await?;
        session.refresh_user().await?;
        Ok(tunnel)
    }

    /// Deletes a tunnel, then refetches tunnels, status and the profile.
    ///
    /// # Errors
    /// Returns the request error.
    pub async fn delete<S: TokenStore>(
        &mut self,
        session: &mut Session<S>,
        id: Uuid,
    ) -> Result<(), ApiError> {
        client::delete_tunnel(session.api(), id).await?;
        info!(%id, "tunnel deleted");

        self.refresh(session.api()).await?;
        session.refresh_user().await?;
        Ok(())
    }

    fn require(&self, id: Uuid) -> Result<&Tunnel, ApiError> {
        self.find(id)
            .ok_or_else(|| ApiError::Validation(format!("No tunnel with id {id}")))
    }
}
