//! Domain-level features (auth, tunnels, admin, contact, billing). Each area
//! keeps its endpoint calls in a `client` module and its wire payloads in a
//! `types` module so the CLI actions stay focused on input and rendering.

pub mod admin;
pub mod auth;
pub mod billing;
pub mod contact;
pub mod tunnels;
