//! API endpoint modules.

pub mod health;
pub mod openapi;

pub use health::configure_health_routes;
pub use openapi::ApiDoc;
