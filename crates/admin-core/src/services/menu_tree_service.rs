// ============================================================================
// Admin Core - Menu Tree Service
// File: crates/admin-core/src/services/menu_tree_service.rs
// ============================================================================
//! Menu tree reads (assemble, overlay, present) and validated writes.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::Arc;

use admin_shared::CodeScope;
use tracing::{info, warn};

use crate::domain::{MenuId, MenuNode, MenuPatch, NewMenuNode, PermissionAssignment, RoleId};
use crate::error::{DomainError, FieldError};
use crate::repositories::{prepare_create, prepare_update, MenuRepository, PermissionRepository};
use crate::tree::invariants::{children_index, descendants, parent_lookup, would_create_cycle};
use crate::tree::{
    apply_selection, assemble, present, prune_to_granted, tree_violations, DisplayNode, MenuForest,
    PresentOptions, TreeViolation,
};

/// Placeholder id for a record that storage has not numbered yet.
const UNSAVED: MenuId = MenuId(i64::MIN);

/// Service over trait objects, as built by the composition point.
pub type DynMenuTreeService = MenuTreeService<dyn MenuRepository, dyn PermissionRepository>;

pub struct MenuTreeService<M: MenuRepository + ?Sized, P: PermissionRepository + ?Sized> {
    menus: Arc<M>,
    permissions: Arc<P>,
    code_scope: CodeScope,
}

impl<M: MenuRepository + ?Sized, P: PermissionRepository + ?Sized> MenuTreeService<M, P> {
    pub fn new(menus: Arc<M>, permissions: Arc<P>, code_scope: CodeScope) -> Self {
        Self {
            menus,
            permissions,
            code_scope,
        }
    }

    /// Fresh forest from storage. Promoted roots are logged, never fatal.
    pub async fn load_forest(&self) -> Result<MenuForest, DomainError> {
        let flat = self.menus.list_all().await?;
        let forest = assemble(flat);
        if forest.is_degraded() {
            warn!(
                orphans = ?forest.orphans,
                cycle_breaks = ?forest.cycle_breaks,
                strategy = ?self.menus.strategy(),
                "Menu tree assembled with promoted roots"
            );
        }
        Ok(forest)
    }

    /// Full tree with the role's selection overlaid (nothing checked without a role).
    pub async fn menu_tree(
        &self,
        role_id: Option<RoleId>,
        options: PresentOptions,
    ) -> Result<Vec<DisplayNode>, DomainError> {
        let forest = self.load_forest().await?;
        let selected = match role_id {
            Some(role_id) => self.permissions.find_by_role(role_id).await?.menu_ids,
            None => BTreeSet::new(),
        };
        let checked = apply_selection(&forest, &selected);
        Ok(present(&checked, options))
    }

    /// Only the branches the role can reach.
    pub async fn granted_tree(&self, role_id: RoleId) -> Result<Vec<DisplayNode>, DomainError> {
        let forest = self.load_forest().await?;
        let assignment = self.permissions.find_by_role(role_id).await?;
        let granted = prune_to_granted(apply_selection(&forest, &assignment.menu_ids));
        Ok(present(&granted, PresentOptions::default()))
    }

    /// Permission codes carried by the role's granted menus.
    pub async fn granted_codes(&self, role_id: RoleId) -> Result<BTreeSet<String>, DomainError> {
        let assignment = self.permissions.find_by_role(role_id).await?;
        let nodes = self.menus.list_all().await?;
        Ok(nodes
            .into_iter()
            .filter(|node| assignment.grants(node.id))
            .filter_map(|node| node.code)
            .collect())
    }

    pub async fn role_assignment(&self, role_id: RoleId) -> Result<PermissionAssignment, DomainError> {
        self.permissions.find_by_role(role_id).await
    }

    pub async fn create_menu(&self, input: NewMenuNode) -> Result<MenuNode, DomainError> {
        let input = prepare_create(input)?;

        if input.code.is_some() && self.code_scope != CodeScope::Disabled {
            let mut nodes = self.menus.list_all().await?;
            nodes.push(MenuNode::from_new(UNSAVED, input.clone()));
            self.ensure_codes_unique(&nodes, &HashSet::from([UNSAVED]))?;
        }

        let id = self.menus.create(input).await?;
        info!("Menu created: {}", id);
        self.reload(id).await
    }

    pub async fn update_menu(&self, id: MenuId, patch: MenuPatch) -> Result<MenuNode, DomainError> {
        let mut nodes = self.menus.list_all().await?;
        let position = nodes
            .iter()
            .position(|node| node.id == id)
            .ok_or(DomainError::MenuNotFound(id))?;
        if patch.is_empty() {
            return Ok(nodes.swap_remove(position));
        }

        let current = nodes[position].clone();
        let moved = patch.moves(&current);
        // Tree shape is checked before field validation, matching storage.
        if let Some(Some(parent_id)) = moved {
            if would_create_cycle(&parent_lookup(&nodes), id, parent_id) {
                warn!("Rejected move of menu {} under {}: cycle", id, parent_id);
                return Err(DomainError::Cycle { node: id, parent: parent_id });
            }
            if !nodes.iter().any(|node| node.id == parent_id) {
                return Err(DomainError::parent_not_found(parent_id));
            }
        }
        let next = prepare_update(&current, &patch)?;
        let moved = moved.is_some();

        if self.code_scope != CodeScope::Disabled && (next.code != current.code || moved) {
            let mut affected = HashSet::from([id]);
            if moved && self.code_scope == CodeScope::Module {
                affected.extend(descendants(&children_index(&nodes), id));
            }
            nodes[position] = next;
            self.ensure_codes_unique(&nodes, &affected)?;
        }

        self.menus.update(id, patch).await?;
        info!("Menu updated: {}", id);
        self.reload(id).await
    }

    pub async fn delete_menu(&self, id: MenuId, cascade: bool) -> Result<Vec<MenuId>, DomainError> {
        let removed = self.menus.delete(id, cascade).await?;
        info!("Menu deleted: {} ({} record(s))", id, removed.len());

        // Stale grants are ignored by the overlay, so a failure here is not fatal.
        if let Err(e) = self.permissions.remove_menus(removed.clone()).await {
            warn!("Failed to drop deleted menus from role assignments: {}", e);
        }
        Ok(removed)
    }

    /// Replaces a role's selection. Every id must name an existing menu.
    pub async fn save_role_permissions(
        &self,
        role_id: RoleId,
        menu_ids: Vec<MenuId>,
    ) -> Result<PermissionAssignment, DomainError> {
        let known: HashSet<MenuId> = self
            .menus
            .list_all()
            .await?
            .into_iter()
            .map(|node| node.id)
            .collect();
        let unknown: BTreeSet<MenuId> = menu_ids
            .iter()
            .filter(|id| !known.contains(id))
            .copied()
            .collect();
        if !unknown.is_empty() {
            let listed = unknown
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            warn!("Rejected permission save for role {}: unknown menus {}", role_id, listed);
            return Err(DomainError::Validation(vec![FieldError::new(
                "menu_ids",
                "unknown_menu",
                format!("unknown menu id(s): {}", listed),
            )]));
        }

        let assignment = PermissionAssignment::new(role_id, menu_ids);
        self.permissions.replace(assignment.clone()).await?;
        info!(
            "Saved {} menu permission(s) for role {}",
            assignment.menu_ids.len(),
            role_id
        );
        Ok(assignment)
    }

    /// Structural problems in stored records.
    pub async fn check_integrity(&self) -> Result<Vec<TreeViolation>, DomainError> {
        let nodes = self.menus.list_all().await?;
        Ok(tree_violations(&nodes))
    }

    async fn reload(&self, id: MenuId) -> Result<MenuNode, DomainError> {
        self.menus
            .find_by_id(id)
            .await?
            .ok_or_else(|| DomainError::InternalError(format!("menu {} vanished after write", id)))
    }

    /// Fails if two records share a code within the configured scope and at
    /// least one of them is in `affected`. Older duplicates elsewhere are left
    /// alone.
    fn ensure_codes_unique(
        &self,
        nodes: &[MenuNode],
        affected: &HashSet<MenuId>,
    ) -> Result<(), DomainError> {
        let modules = match self.code_scope {
            CodeScope::Module => assemble(nodes.to_vec()).module_of(),
            _ => HashMap::new(),
        };
        let mut holders: BTreeMap<(Option<MenuId>, &str), Vec<MenuId>> = BTreeMap::new();

        for node in nodes {
            let Some(code) = node.code.as_deref() else {
                continue;
            };
            let group = match self.code_scope {
                CodeScope::Disabled => return Ok(()),
                CodeScope::Global => None,
                CodeScope::Siblings => node.parent_id,
                CodeScope::Module => Some(modules.get(&node.id).copied().unwrap_or(node.id)),
            };
            holders.entry((group, code)).or_default().push(node.id);
        }

        for ((_, code), ids) in holders {
            if ids.len() > 1 && ids.iter().any(|id| affected.contains(id)) {
                warn!("Rejected duplicate menu code {} ({} scope)", code, self.code_scope);
                return Err(DomainError::DuplicateCode {
                    code: code.to_string(),
                    scope: self.code_scope,
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockall::predicate::eq;
    use uuid::Uuid;

    use super::*;
    use crate::domain::MenuType;
    use crate::repositories::{MockMenuRepository, MockPermissionRepository};

    fn node(id: i64, parent: Option<i64>, code: Option<&str>) -> MenuNode {
        MenuNode {
            code: code.map(str::to_string),
            ..MenuNode::from_new(
                MenuId(id),
                NewMenuNode {
                    parent_id: parent.map(MenuId),
                    ..NewMenuNode::new(format!("n{}", id), MenuType::Catalog)
                },
            )
        }
    }

    fn button(parent: i64, code: &str) -> NewMenuNode {
        NewMenuNode {
            parent_id: Some(MenuId(parent)),
            code: Some(code.to_string()),
            ..NewMenuNode::new("Add", MenuType::Button)
        }
    }

    fn menus_with(nodes: Vec<MenuNode>) -> MockMenuRepository {
        let mut menus = MockMenuRepository::new();
        menus
            .expect_list_all()
            .returning(move || Ok(nodes.clone()));
        menus
            .expect_strategy()
            .return_const(admin_shared::TreeStrategy::Adjacency);
        menus
    }

    fn service(
        menus: MockMenuRepository,
        permissions: MockPermissionRepository,
        scope: CodeScope,
    ) -> MenuTreeService<MockMenuRepository, MockPermissionRepository> {
        MenuTreeService::new(Arc::new(menus), Arc::new(permissions), scope)
    }

    fn role() -> RoleId {
        RoleId(Uuid::new_v4())
    }

    #[tokio::test]
    async fn test_menu_tree_overlays_role_selection() {
        let menus = menus_with(vec![node(1, None, None), node(2, Some(1), None), node(3, Some(2), None)]);
        let mut permissions = MockPermissionRepository::new();
        permissions
            .expect_find_by_role()
            .returning(|role_id| Ok(PermissionAssignment::new(role_id, [MenuId(3)])));

        let svc = service(menus, permissions, CodeScope::Global);
        let tree = svc
            .menu_tree(
                Some(role()),
                PresentOptions {
                    editable: false,
                    checkable: true,
                },
            )
            .await
            .unwrap();

        let a = &tree[0];
        let b = &a.children[0];
        let c = &b.children[0];
        assert!(a.indeterminate && !a.checked && a.checkable);
        assert!(b.indeterminate && !b.checked);
        assert!(c.checked && !c.indeterminate);
    }

    #[tokio::test]
    async fn test_menu_tree_without_role_skips_permission_lookup() {
        let menus = menus_with(vec![node(1, None, None), node(2, Some(77), None)]);
        let permissions = MockPermissionRepository::new();

        let svc = service(menus, permissions, CodeScope::Global);
        let tree = svc.menu_tree(None, PresentOptions::default()).await.unwrap();

        assert_eq!(tree.len(), 2);
        assert!(tree.iter().all(|n| !n.checked && !n.indeterminate));
    }

    #[tokio::test]
    async fn test_granted_tree_and_codes() {
        let menus = menus_with(vec![
            node(1, None, None),
            node(2, Some(1), Some("user:add")),
            node(3, Some(1), Some("user:delete")),
            node(4, None, None),
        ]);
        let mut permissions = MockPermissionRepository::new();
        permissions
            .expect_find_by_role()
            .returning(|role_id| Ok(PermissionAssignment::new(role_id, [MenuId(2)])));

        let svc = service(menus, permissions, CodeScope::Global);
        let role_id = role();
        let granted = svc.granted_tree(role_id).await.unwrap();
        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].id, MenuId(1));
        assert_eq!(granted[0].children.len(), 1);
        assert_eq!(granted[0].children[0].id, MenuId(2));

        let codes = svc.granted_codes(role_id).await.unwrap();
        assert_eq!(codes, BTreeSet::from(["user:add".to_string()]));
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_global_code() {
        let menus = menus_with(vec![node(1, None, None), node(2, Some(1), Some("user:add"))]);
        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Global);

        let err = svc.create_menu(button(1, "user:add")).await.unwrap_err();
        assert!(matches!(err, DomainError::DuplicateCode { ref code, scope: CodeScope::Global } if code == "user:add"));
    }

    #[tokio::test]
    async fn test_sibling_scope_allows_code_under_other_parent() {
        let mut menus = menus_with(vec![
            node(1, None, None),
            node(2, None, None),
            node(3, Some(1), Some("export")),
        ]);
        menus
            .expect_create()
            .withf(|input| input.parent_id == Some(MenuId(2)))
            .times(1)
            .returning(|_| Ok(MenuId(4)));
        menus
            .expect_find_by_id()
            .with(eq(MenuId(4)))
            .returning(|id| Ok(Some(node(id.0, Some(2), Some("export")))));

        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Siblings);
        let created = svc.create_menu(button(2, "export")).await.unwrap();
        assert_eq!(created.id, MenuId(4));
    }

    #[tokio::test]
    async fn test_disabled_scope_skips_lookup() {
        let mut menus = MockMenuRepository::new();
        menus.expect_create().times(1).returning(|_| Ok(MenuId(9)));
        menus
            .expect_find_by_id()
            .returning(|id| Ok(Some(node(id.0, Some(1), Some("dup")))));

        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Disabled);
        assert!(svc.create_menu(button(1, "dup")).await.is_ok());
    }

    #[tokio::test]
    async fn test_create_validation_fails_before_storage() {
        let menus = MockMenuRepository::new();
        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Global);

        let err = svc
            .create_menu(NewMenuNode::new(" ", MenuType::Catalog))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_module_scope_checks_moved_subtree() {
        // Module 1 already uses "report"; 3 (under module 2) has a child with "report".
        let menus = menus_with(vec![
            node(1, None, None),
            node(2, None, None),
            node(10, Some(1), Some("report")),
            node(3, Some(2), None),
            node(4, Some(3), Some("report")),
        ]);
        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Module);

        let err = svc
            .update_menu(MenuId(3), MenuPatch::reparent(Some(MenuId(1))))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateCode { scope: CodeScope::Module, .. }));
    }

    #[tokio::test]
    async fn test_update_unknown_menu_is_not_found() {
        let menus = menus_with(vec![node(1, None, None)]);
        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Global);

        let err = svc
            .update_menu(MenuId(5), MenuPatch::reparent(None))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::MenuNotFound(MenuId(5))));
    }

    #[tokio::test]
    async fn test_update_checks_cycle_before_field_validation() {
        let mut menus = menus_with(vec![node(1, None, None), node(2, Some(1), None)]);
        menus.expect_update().never();
        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Global);

        let patch = MenuPatch {
            label: Some(String::new()),
            ..MenuPatch::reparent(Some(MenuId(2)))
        };
        let err = svc.update_menu(MenuId(1), patch).await.unwrap_err();
        assert!(matches!(err, DomainError::Cycle { node: MenuId(1), parent: MenuId(2) }));

        let err = svc
            .update_menu(MenuId(2), MenuPatch::reparent(Some(MenuId(9))))
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].code, "parent_not_found");
    }

    #[tokio::test]
    async fn test_update_passes_cycle_error_through() {
        // Storage sees a move the loaded snapshot did not.
        let mut menus = menus_with(vec![node(1, None, None), node(2, None, None)]);
        menus.expect_update().returning(|id, _| {
            Err(DomainError::Cycle {
                node: id,
                parent: MenuId(2),
            })
        });
        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Global);

        let err = svc
            .update_menu(MenuId(1), MenuPatch::reparent(Some(MenuId(2))))
            .await
            .unwrap_err();
        assert_eq!(err.error_code(), "CYCLE_ERROR");
    }

    #[tokio::test]
    async fn test_delete_drops_grants_and_tolerates_grant_failure() {
        let mut menus = MockMenuRepository::new();
        menus
            .expect_delete()
            .with(eq(MenuId(2)), eq(true))
            .returning(|id, _| Ok(vec![id, MenuId(3)]));
        let mut permissions = MockPermissionRepository::new();
        permissions
            .expect_remove_menus()
            .with(eq(vec![MenuId(2), MenuId(3)]))
            .times(1)
            .returning(|_| Err(DomainError::DatabaseError("down".to_string())));

        let svc = service(menus, permissions, CodeScope::Global);
        let removed = svc.delete_menu(MenuId(2), true).await.unwrap();
        assert_eq!(removed, vec![MenuId(2), MenuId(3)]);
    }

    #[tokio::test]
    async fn test_save_role_permissions_rejects_unknown_ids() {
        let menus = menus_with(vec![node(1, None, None)]);
        let permissions = MockPermissionRepository::new();
        let svc = service(menus, permissions, CodeScope::Global);

        let err = svc
            .save_role_permissions(role(), vec![MenuId(1), MenuId(8)])
            .await
            .unwrap_err();
        assert_eq!(err.field_errors()[0].code, "unknown_menu");
    }

    #[tokio::test]
    async fn test_save_role_permissions_replaces_assignment() {
        let menus = menus_with(vec![node(1, None, None), node(2, Some(1), None)]);
        let mut permissions = MockPermissionRepository::new();
        permissions
            .expect_replace()
            .withf(|a| a.menu_ids == BTreeSet::from([MenuId(1), MenuId(2)]))
            .times(1)
            .returning(|_| Ok(()));

        let svc = service(menus, permissions, CodeScope::Global);
        let saved = svc
            .save_role_permissions(role(), vec![MenuId(2), MenuId(1), MenuId(2)])
            .await
            .unwrap();
        assert_eq!(saved.menu_ids.len(), 2);
    }

    #[tokio::test]
    async fn test_check_integrity_reports_orphans() {
        let menus = menus_with(vec![node(1, None, None), node(2, Some(40), None)]);
        let svc = service(menus, MockPermissionRepository::new(), CodeScope::Global);

        let violations = svc.check_integrity().await.unwrap();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].error_code(), "menu_unknown_parent");
    }
}
