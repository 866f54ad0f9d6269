// ============================================================================
// Admin Infrastructure - In-Memory Menu Repository
// File: crates/admin-infrastructure/src/memory/menu_store.rs
// Description: Menu tree held in process, adjacency list or closure table
// ============================================================================
//! Every write takes the write lock, runs all of its checks, and only then
//! mutates, so a rejected write leaves the table as it was.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{info, warn};

use admin_core::domain::{MenuId, MenuNode, MenuPatch, NewMenuNode};
use admin_core::error::DomainError;
use admin_core::repositories::{prepare_create, prepare_update, MenuRepository};
use admin_core::tree::invariants::{children_index, descendants, parent_lookup, would_create_cycle};
use admin_shared::TreeStrategy;

use super::closure_index::ClosureIndex;

#[derive(Debug)]
enum TreeIndex {
    ParentLinks,
    Closure(ClosureIndex),
}

#[derive(Debug)]
struct MenuTable {
    nodes: Vec<MenuNode>,
    next_id: i64,
    index: TreeIndex,
}

impl MenuTable {
    fn position(&self, id: MenuId) -> Option<usize> {
        self.nodes.iter().position(|node| node.id == id)
    }

    fn contains(&self, id: MenuId) -> bool {
        self.position(id).is_some()
    }

    fn child_count(&self, id: MenuId) -> usize {
        self.nodes
            .iter()
            .filter(|node| node.parent_id == Some(id) && node.id != id)
            .count()
    }

    fn descendants(&self, id: MenuId) -> Vec<MenuId> {
        match &self.index {
            TreeIndex::ParentLinks => descendants(&children_index(&self.nodes), id),
            TreeIndex::Closure(closure) => closure.descendants(id),
        }
    }

    /// Whether hanging `id` under `parent_id` would make `id` its own ancestor.
    fn would_cycle(&self, id: MenuId, parent_id: MenuId) -> bool {
        match &self.index {
            TreeIndex::ParentLinks => would_create_cycle(&parent_lookup(&self.nodes), id, parent_id),
            TreeIndex::Closure(closure) => closure.contains(id, parent_id),
        }
    }
}

pub struct InMemoryMenuRepository {
    strategy: TreeStrategy,
    table: RwLock<MenuTable>,
}

impl InMemoryMenuRepository {
    pub fn new(strategy: TreeStrategy) -> Self {
        Self::with_nodes(strategy, Vec::new())
    }

    /// Seeds the table as-is; records are not validated, so inconsistent
    /// trees can be loaded on purpose.
    pub fn with_nodes(strategy: TreeStrategy, nodes: Vec<MenuNode>) -> Self {
        let next_id = nodes.iter().map(|node| node.id.0).max().unwrap_or(0) + 1;
        let index = match strategy {
            TreeStrategy::Adjacency => TreeIndex::ParentLinks,
            TreeStrategy::Closure => TreeIndex::Closure(ClosureIndex::from_nodes(&nodes)),
        };
        Self {
            strategy,
            table: RwLock::new(MenuTable {
                nodes,
                next_id,
                index,
            }),
        }
    }

    /// Copy of the closure index, `None` for the adjacency strategy.
    pub async fn closure_snapshot(&self) -> Option<ClosureIndex> {
        match &self.table.read().await.index {
            TreeIndex::ParentLinks => None,
            TreeIndex::Closure(closure) => Some(closure.clone()),
        }
    }
}

#[async_trait]
impl MenuRepository for InMemoryMenuRepository {
    fn strategy(&self) -> TreeStrategy {
        self.strategy
    }

    async fn list_all(&self) -> Result<Vec<MenuNode>, DomainError> {
        Ok(self.table.read().await.nodes.clone())
    }

    async fn find_by_id(&self, id: MenuId) -> Result<Option<MenuNode>, DomainError> {
        let table = self.table.read().await;
        Ok(table.position(id).map(|pos| table.nodes[pos].clone()))
    }

    async fn descendant_ids(&self, id: MenuId) -> Result<Vec<MenuId>, DomainError> {
        let table = self.table.read().await;
        if !table.contains(id) {
            return Err(DomainError::MenuNotFound(id));
        }
        Ok(table.descendants(id))
    }

    async fn create(&self, input: NewMenuNode) -> Result<MenuId, DomainError> {
        let input = prepare_create(input)?;
        let mut table = self.table.write().await;

        if let Some(parent_id) = input.parent_id {
            if !table.contains(parent_id) {
                return Err(DomainError::parent_not_found(parent_id));
            }
        }

        let id = MenuId(table.next_id);
        table.next_id += 1;
        let parent_id = input.parent_id;
        table.nodes.push(MenuNode::from_new(id, input));
        if let TreeIndex::Closure(closure) = &mut table.index {
            closure.link(id, parent_id);
        }

        info!("Menu stored: {} ({:?})", id, self.strategy);
        Ok(id)
    }

    async fn update(&self, id: MenuId, patch: MenuPatch) -> Result<(), DomainError> {
        let mut table = self.table.write().await;

        let pos = table.position(id).ok_or(DomainError::MenuNotFound(id))?;
        let current = &table.nodes[pos];
        let new_parent = patch.moves(current);

        if let Some(Some(parent_id)) = new_parent {
            if parent_id == id {
                warn!("Rejected self-parent move for menu {}", id);
                return Err(DomainError::Cycle { node: id, parent: parent_id });
            }
            if !table.contains(parent_id) {
                return Err(DomainError::parent_not_found(parent_id));
            }
            if table.would_cycle(id, parent_id) {
                warn!("Rejected move of menu {} under its descendant {}", id, parent_id);
                return Err(DomainError::Cycle { node: id, parent: parent_id });
            }
        }

        let next = prepare_update(current, &patch)?;

        table.nodes[pos] = next;
        if let (Some(parent_id), TreeIndex::Closure(closure)) = (new_parent, &mut table.index) {
            closure.relink(id, parent_id);
        }
        Ok(())
    }

    async fn delete(&self, id: MenuId, cascade: bool) -> Result<Vec<MenuId>, DomainError> {
        let mut table = self.table.write().await;

        if !table.contains(id) {
            return Err(DomainError::MenuNotFound(id));
        }
        let children = table.child_count(id);
        if children > 0 && !cascade {
            return Err(DomainError::HasChildren { id, children });
        }

        let mut removed = vec![id];
        if children > 0 {
            removed.extend(table.descendants(id));
        }

        table.nodes.retain(|node| !removed.contains(&node.id));
        if let TreeIndex::Closure(closure) = &mut table.index {
            closure.unlink(&removed);
        }
        Ok(removed)
    }
}
