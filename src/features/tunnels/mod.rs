//! Tunnel feature: the caller's tunnels, their live status, creation with a
//! debounced subdomain check, and the per-tunnel mutations.

pub mod availability;
pub mod card;
pub mod client;
pub mod dashboard;
pub mod form;
pub mod services;
pub mod types;

pub use availability::{api_checker, Availability, AvailabilityChecker};
pub use card::{format_uptime, uptime_label, TunnelCard, UptimeStyle};
pub use dashboard::Dashboard;
pub use form::CreateTunnelForm;
pub use types::{PeerStatus, StatusMap, Tunnel};
