//! Business logic services.

pub mod login;
pub mod roles;

pub use login::{ProviderRegistry, configure_routes as configure_login_routes};
pub use roles::configure_routes as configure_role_routes;
