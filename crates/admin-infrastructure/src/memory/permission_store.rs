//! In-memory role -> menu grants

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use admin_core::domain::{MenuId, PermissionAssignment, RoleId};
use admin_core::error::DomainError;
use admin_core::repositories::PermissionRepository;

#[derive(Default)]
pub struct InMemoryPermissionRepository {
    grants: RwLock<HashMap<RoleId, BTreeSet<MenuId>>>,
}

impl InMemoryPermissionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PermissionRepository for InMemoryPermissionRepository {
    async fn find_by_role(&self, role_id: RoleId) -> Result<PermissionAssignment, DomainError> {
        let grants = self.grants.read().await;
        Ok(match grants.get(&role_id) {
            Some(menu_ids) => PermissionAssignment::new(role_id, menu_ids.iter().copied()),
            None => PermissionAssignment::empty(role_id),
        })
    }

    async fn replace(&self, assignment: PermissionAssignment) -> Result<(), DomainError> {
        let mut grants = self.grants.write().await;
        if assignment.is_empty() {
            grants.remove(&assignment.role_id);
        } else {
            grants.insert(assignment.role_id, assignment.menu_ids);
        }
        Ok(())
    }

    async fn remove_menus(&self, menu_ids: Vec<MenuId>) -> Result<(), DomainError> {
        let mut grants = self.grants.write().await;
        for held in grants.values_mut() {
            held.retain(|id| !menu_ids.contains(id));
        }
        grants.retain(|_, held| !held.is_empty());
        info!("Dropped {} menu(s) from role grants", menu_ids.len());
        Ok(())
    }
}
