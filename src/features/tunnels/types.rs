use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tunnel {
    pub id: Uuid,
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
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Tunnel {
    /// Address the reverse proxy forwards to.
    #[must_use]
    pub fn routing_ip(&self) -> &str {
        if self.use_device_ip {
            &self.device_ip
        } else {
            &self.vpn_ip
        }
    }
}

/// Live WireGuard state of one tunnel's peer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerStatus {
    pub connected: bool,
    /// Unix seconds of the handshake that started the connection, 0 when
    /// unknown.
    #[serde(default)]
    pub connected_since: i64,
}

/// Status map keyed by tunnel id. Tunnels missing from it are disconnected.
pub type StatusMap = HashMap<Uuid, PeerStatus>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTunnelRequest {
    pub subdomain: String,
    pub target_port: u16,
    pub service_type: String,
}

/// Partial update; absent fields are left untouched by the backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_device_ip: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubdomainCheck {
    pub subdomain: String,
    pub available: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tunnel_tolerates_missing_optional_fields() {
        let tunnel: Tunnel = serde_json::from_value(json!({
            "id": "0b5cf0f4-5b8d-4d4e-a1e3-44f1f0c8e6a1",
            "subdomain": "nas",
            "target_port": 443,
            "vpn_ip": "172.16.0.2",
            "device_ip": "10.0.0.2",
            "is_active": true,
            "full_domain": "nas.homeaccess.site",
            "created_at": "2026-01-01T00:00:00Z"
        }))
        .unwrap();

        assert_eq!(tunnel.service_type, None);
        assert!(!tunnel.use_device_ip);
        assert_eq!(tunnel.routing_ip(), "172.16.0.2");
    }

    #[test]
    fn status_map_keys_parse_as_ids() {
        let map: StatusMap = serde_json::from_value(json!({
            "0b5cf0f4-5b8d-4d4e-a1e3-44f1f0c8e6a1": { "connected": true, "connected_since": 1_700_000_000 }
        }))
        .unwrap();

        let id = Uuid::parse_str("0b5cf0f4-5b8d-4d4e-a1e3-44f1f0c8e6a1").unwrap();
        assert_eq!(
            map.get(&id),
            Some(&PeerStatus {
                connected: true,
                connected_since: 1_700_000_000
            })
        );
    }

    #[test]
    fn update_omits_unset_fields() {
        let update = TunnelUpdate {
            is_active: Some(false),
            ..TunnelUpdate::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), json!({ "is_active": false }));
    }
}
