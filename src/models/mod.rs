//! Domain models for the dashboard auth server.

use serde::Serialize;
use utoipa::ToSchema;

pub mod role;
pub mod source;
pub mod user;

// Re-export commonly used types
pub use role::{Permissions, Role, RoleListResponse, RoleRequest, RoleResponse, RoleUpdate};
pub use source::{Source, SourceKind};
pub use user::{RoleUser, UserResponse};

/// API prefix used when rendering resource links.
pub const API_PREFIX: &str = "/api/v1";

/// Self-referential link of a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SelfLinks {
    #[serde(rename = "self")]
    pub self_link: String,
}

impl SelfLinks {
    /// Link to `/sources/{id}/{collection}/{name}`, with `name` percent-encoded.
    pub fn new(source_id: i64, collection: &str, name: &str) -> Self {
        Self {
            self_link: format!(
                "{}/sources/{}/{}/{}",
                API_PREFIX,
                source_id,
                collection,
                urlencoding::encode(name)
            ),
        }
    }
}
