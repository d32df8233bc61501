//! Tunnel card view model and the uptime labels shared with the admin panel.

use crate::features::tunnels::{
    services::service_name,
    types::{PeerStatus, Tunnel},
};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

/// How the hour form of an uptime is rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UptimeStyle {
    /// `"2h"` when the minutes are zero, `"2h05"` otherwise.
    Dashboard,
    /// Always `"2h05"`.
    Admin,
}

/// Formats an elapsed duration in seconds. Negative input clamps to zero.
#[must_use]
pub fn format_uptime(seconds: i64, style: UptimeStyle) -> String {
    let seconds = seconds.max(0);
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 3600 {
        return format!("{}min", seconds / 60);
    }
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    match style {
        UptimeStyle::Dashboard if minutes == 0 => format!("{hours}h"),
        _ => format!("{hours}h{minutes:02}"),
    }
}

/// Uptime label for a peer, only while it is connected with a known start.
#[must_use]
pub fn uptime_label(status: &PeerStatus, now: i64, style: UptimeStyle) -> Option<String> {
    (status.connected && status.connected_since > 0)
        .then(|| format_uptime(now - status.connected_since, style))
}

/// Current unix time in seconds.
#[must_use]
pub fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| i64::try_from(elapsed.as_secs()).unwrap_or(i64::MAX))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TunnelCard {
    pub id: Uuid,
    pub subdomain: String,
    pub public_url: String,
    pub service: &'static str,
    pub port: u16,
    pub routing_ip: String,
    pub use_device_ip: bool,
    pub is_active: bool,
    pub status: PeerStatus,
}

impl TunnelCard {
    /// Builds the card; a tunnel without a status entry is disconnected.
    #[must_use]
    pub fn new(tunnel: &Tunnel, status: Option<&PeerStatus>) -> Self {
        Self {
            id: tunnel.id,
            subdomain: tunnel.subdomain.clone(),
            public_url: format!("https://{}", tunnel.full_domain),
            service: service_name(tunnel.service_type.as_deref()),
            port: tunnel.target_port,
            routing_ip: tunnel.routing_ip().to_string(),
            use_device_ip: tunnel.use_device_ip,
            is_active: tunnel.is_active,
            status: status.copied().unwrap_or_default(),
        }
    }

    #[must_use]
    pub const fn state_label(&self) -> &'static str {
        if self.is_active {
            "Active"
        } else {
            "Inactive"
        }
    }

    /// Connection badge, hidden for disabled tunnels.
    #[must_use]
    pub const fn connection_label(&self) -> Option<&'static str> {
        if !self.is_active {
            return None;
        }
        Some(if self.status.connected {
            "Connected"
        } else {
            "Disconnected"
        })
    }

    #[must_use]
    pub fn uptime(&self, now: i64) -> Option<String> {
        if !self.is_active {
            return None;
        }
        uptime_label(&self.status, now, UptimeStyle::Dashboard)
    }

    #[must_use]
    pub const fn routing_label(&self) -> &'static str {
        if self.use_device_ip {
            "device"
        } else {
            "VPN"
        }
    }

    /// File name the WireGuard config is saved under.
    #[must_use]
    pub fn config_filename(&self) -> String {
        format!("homevpn-{}.conf", self.subdomain)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tunnel(active: bool, device: bool) -> Tunnel {
        Tunnel {
            id: Uuid::nil(),
            subdomain: "nas".to_string(),
            target_port: 8123,
            service_type: Some("homeassistant".to_string()),
            vpn_ip: "172.16.0.2".to_string(),
            device_ip: "192.168.1.20".to_string(),
            use_device_ip: device,
            is_active: active,
            full_domain: "nas.homeaccess.site".to_string(),
            created_at: "2026-01-01T00:00:00Z".to_string(),
            updated_at: None,
        }
    }

    #[test]
    fn uptime_thresholds() {
        assert_eq!(format_uptime(0, UptimeStyle::Dashboard), "0s");
        assert_eq!(format_uptime(59, UptimeStyle::Dashboard), "59s");
        assert_eq!(format_uptime(60, UptimeStyle::Dashboard), "1min");
        assert_eq!(format_uptime(3599, UptimeStyle::Dashboard), "59min");
        assert_eq!(format_uptime(3600, UptimeStyle::Dashboard), "1h");
        assert_eq!(format_uptime(3600, UptimeStyle::Admin), "1h00");
        assert_eq!(format_uptime(2 * 3600 + 5 * 60, UptimeStyle::Dashboard), "2h05");
        assert_eq!(format_uptime(-30, UptimeStyle::Admin), "0s");
    }

    #[test]
    fn uptime_needs_connection_and_start() {
        let connected = PeerStatus {
            connected: true,
            connected_since: 1_000,
        };
        assert_eq!(
            uptime_label(&connected, 1_090, UptimeStyle::Dashboard).as_deref(),
            Some("1min")
        );

        let unknown_start = PeerStatus {
            connected: true,
            connected_since: 0,
        };
        assert!(uptime_label(&unknown_start, 1_090, UptimeStyle::Dashboard).is_none());
        assert!(uptime_label(&PeerStatus::default(), 1_090, UptimeStyle::Admin).is_none());
    }

    #[test]
    fn card_uses_routing_target_and_service_name() {
        let card = TunnelCard::new(&tunnel(true, true), None);
        assert_eq!(card.routing_ip, "192.168.1.20");
        assert_eq!(card.routing_label(), "device");
        assert_eq!(card.service, "Home Assistant");
        assert_eq!(card.public_url, "https://nas.homeaccess.site");
        assert_eq!(card.config_filename(), "homevpn-nas.conf");
        assert_eq!(card.connection_label(), Some("Disconnected"));
    }

    #[test]
    fn inactive_card_hides_connection_badge() {
        let status = PeerStatus {
            connected: true,
            connected_since: 10,
        };
        let card = TunnelCard::new(&tunnel(false, false), Some(&status));
        assert_eq!(card.state_label(), "Inactive");
        assert_eq!(card.connection_label(), None);
        assert_eq!(card.uptime(100), None);
        assert_eq!(card.routing_ip, "172.16.0.2");
    }
}
