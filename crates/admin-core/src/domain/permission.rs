// ============================================================================
// Admin Core - Permission Assignment
// File: crates/admin-core/src/domain/permission.rs
// Description: Set of menu ids granted to a role
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::menu::MenuId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleId(pub Uuid);

impl fmt::Display for RoleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RoleId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::from_str(s).map(Self)
    }
}

impl From<Uuid> for RoleId {
    fn from(value: Uuid) -> Self {
        Self(value)
    }
}

/// Menu ids granted to one role, joined against the menu forest at read time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionAssignment {
    pub role_id: RoleId,
    pub menu_ids: BTreeSet<MenuId>,
}

impl PermissionAssignment {
    pub fn new(role_id: RoleId, menu_ids: impl IntoIterator<Item = MenuId>) -> Self {
        Self {
            role_id,
            menu_ids: menu_ids.into_iter().collect(),
        }
    }

    pub fn empty(role_id: RoleId) -> Self {
        Self::new(role_id, [])
    }

    pub fn grants(&self, menu_id: MenuId) -> bool {
        self.menu_ids.contains(&menu_id)
    }

    pub fn is_empty(&self) -> bool {
        self.menu_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_deduplicates_ids() {
        let role = RoleId(Uuid::new_v4());
        let assignment = PermissionAssignment::new(role, [MenuId(3), MenuId(1), MenuId(3)]);

        assert_eq!(assignment.menu_ids.len(), 2);
        assert!(assignment.grants(MenuId(1)));
        assert!(!assignment.grants(MenuId(2)));
        assert!(PermissionAssignment::empty(role).is_empty());
    }
}
