//! In-memory role store.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{RolesStore, StoreError, StoreResult};
use crate::models::{Role, RoleUpdate};

/// Roles kept in a name-ordered map behind an async lock.
#[derive(Debug, Default)]
pub struct MemoryRolesStore {
    roles: RwLock<BTreeMap<String, Role>>,
}

impl MemoryRolesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RolesStore for MemoryRolesStore {
    async fn get(&self, name: &str) -> StoreResult<Role> {
        self.roles
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn add(&self, role: Role) -> StoreResult<Role> {
        // Check and insert under one write guard.
        let mut roles = self.roles.write().await;
        match roles.entry(role.name.clone()) {
            Entry::Occupied(_) => Err(StoreError::AlreadyExists(role.name)),
            Entry::Vacant(slot) => {
                debug!(role = %role.name, "role added");
                Ok(slot.insert(role).clone())
            }
        }
    }

    async fn update(&self, update: RoleUpdate) -> StoreResult<Role> {
        let mut roles = self.roles.write().await;
        let role = roles
            .get_mut(&update.name)
            .ok_or_else(|| StoreError::NotFound(update.name.clone()))?;

        if let Some(users) = update.users {
            role.users = users;
        }
        if let Some(permissions) = update.permissions {
            role.permissions = permissions;
        }
        debug!(role = %role.name, "role updated");
        Ok(role.clone())
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        self.roles
            .write()
            .await
            .remove(name)
            .map(|_| debug!(role = %name, "role deleted"))
            .ok_or_else(|| StoreError::NotFound(name.to_string()))
    }

    async fn all(&self) -> StoreResult<Vec<Role>> {
        Ok(self.roles.read().await.values().cloned().collect())
    }
}
