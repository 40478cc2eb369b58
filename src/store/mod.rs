//! Role storage, one store per source.

mod memory;

use async_trait::async_trait;

use crate::models::{Role, RoleUpdate};

pub use memory::MemoryRolesStore;

/// Role store errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Role {0} not found")]
    NotFound(String),

    #[error("Role {0} already exists")]
    AlreadyExists(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Roles of a single source.
///
/// Implementations own the atomicity of the name uniqueness check: two
/// concurrent `add` calls with one name must yield one success and one
/// `AlreadyExists`.
#[async_trait]
pub trait RolesStore: Send + Sync {
    async fn get(&self, name: &str) -> StoreResult<Role>;

    /// Insert a new role; fails without side effects if the name is taken.
    async fn add(&self, role: Role) -> StoreResult<Role>;

    /// Change the users and/or permissions of an existing role.
    async fn update(&self, update: RoleUpdate) -> StoreResult<Role>;

    async fn delete(&self, name: &str) -> StoreResult<()>;

    /// All roles, in the order the store keeps them.
    async fn all(&self) -> StoreResult<Vec<Role>>;
}
