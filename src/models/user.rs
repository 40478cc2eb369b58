//! User references carried by roles.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::SelfLinks;

/// A user named as a member of a role.
///
/// Only the name is recorded; whether the user exists on the source is
/// not checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct RoleUser {
    #[serde(default)]
    pub name: String,
}

impl RoleUser {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// User summary embedded in role responses.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    pub name: String,
    pub links: SelfLinks,
}

impl UserResponse {
    pub fn new(source_id: i64, name: &str) -> Self {
        Self {
            name: name.to_string(),
            links: SelfLinks::new(source_id, "users", name),
        }
    }
}
