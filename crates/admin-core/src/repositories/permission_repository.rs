//! Permission assignment repository trait (port)

use async_trait::async_trait;

use crate::domain::{MenuId, PermissionAssignment, RoleId};
use crate::error::DomainError;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PermissionRepository: Send + Sync {
    /// Empty assignment when the role has never been granted anything.
    async fn find_by_role(&self, role_id: RoleId) -> Result<PermissionAssignment, DomainError>;

    /// Replaces the role's whole selection atomically.
    async fn replace(&self, assignment: PermissionAssignment) -> Result<(), DomainError>;

    /// Drops deleted menus from every role.
    async fn remove_menus(&self, menu_ids: Vec<MenuId>) -> Result<(), DomainError>;
}
