//! Role models: stored roles, request bodies and responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{RoleUser, SelfLinks, UserResponse};

/// Permission scope mapped to the actions allowed in it.
pub type Permissions = BTreeMap<String, Vec<String>>;

/// A named set of users and permissions scoped to one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    pub name: String,
    #[serde(default)]
    pub users: Vec<RoleUser>,
    #[serde(default)]
    pub permissions: Permissions,
}

/// Partial role update; `None` leaves the stored value unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleUpdate {
    pub name: String,
    pub users: Option<Vec<RoleUser>>,
    pub permissions: Option<Permissions>,
}

/// Body for creating or updating a role.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct RoleRequest {
    /// Role name; ignored on update, where the path names the role
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub users: Option<Vec<RoleUser>>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub permissions: Option<Permissions>,
}

impl RoleRequest {
    /// Role to create from this request.
    pub fn into_role(self) -> Role {
        Role {
            name: self.name,
            users: self.users.unwrap_or_default(),
            permissions: self.permissions.unwrap_or_default(),
        }
    }

    /// Update for the role named `name`; the body's own name is discarded.
    pub fn into_update(self, name: String) -> RoleUpdate {
        RoleUpdate {
            name,
            users: self.users,
            permissions: self.permissions,
        }
    }
}

/// Role as returned by the API.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct RoleResponse {
    pub users: Vec<UserResponse>,
    pub name: String,
    #[schema(value_type = Object)]
    pub permissions: Permissions,
    pub links: SelfLinks,
}

impl RoleResponse {
    pub fn new(source_id: i64, role: &Role) -> Self {
        Self {
            users: role
                .users
                .iter()
                .map(|u| UserResponse::new(source_id, &u.name))
                .collect(),
            name: role.name.clone(),
            permissions: role.permissions.clone(),
            links: SelfLinks::new(source_id, "roles", &role.name),
        }
    }
}

/// Role list response.
#[derive(Debug, Serialize, ToSchema)]
pub struct RoleListResponse {
    pub roles: Vec<RoleResponse>,
}
