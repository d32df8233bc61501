//! # HomeAccess client
//!
//! `homeaccess` is the client side of the HomeAccess tunnel provisioning
//! service. The backend owns every hard piece (subdomain allocation,
//! WireGuard peers, TLS issuance, quotas); this crate collects input,
//! validates it locally, calls the REST API, and renders the results.
//!
//! ## Layout
//!
//! - [`api`] holds the single HTTP client every feature goes through. It
//!   attaches the bearer token, applies the request timeout and turns error
//!   bodies into [`api::ApiError`] values carrying the server `detail`.
//! - [`features`] groups the domain areas (auth, tunnels, admin, contact,
//!   billing). Each area has a `client` module with the endpoint calls, a
//!   `types` module with the wire payloads, and view models for rendering.
//! - [`poll`] is the cancellable polling subscription shared by every view
//!   that shows live peer status.
//! - [`cli`] maps command-line arguments to actions, one per former page.
//!
//! ## Session lifecycle
//!
//! The session is an explicit value, never a global: it is created at start
//! from the token store, refreshed against `/auth/me` whenever the token
//! changes, and torn down on logout or when the backend rejects the token.

pub mod api;
pub mod cli;
pub mod config;
pub mod features;
pub mod poll;
pub mod routes;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
