//! Dashboard auth server library.
//!
//! OAuth2 principal resolution (GitHub, generic userinfo providers) and
//! per-source role management, served over actix-web.

pub mod api;
pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod oauth;
pub mod services;
pub mod sources;
pub mod store;
