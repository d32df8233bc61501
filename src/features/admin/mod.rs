//! Admin feature: user moderation, quotas, tunnel oversight and the
//! activity log. Only reachable when the session profile has `is_admin`.

pub mod client;
pub mod panel;
pub mod types;

pub use panel::AdminPanel;
pub use types::{ActivityEntry, ActivityQuery, AdminTunnel, AdminUser};
