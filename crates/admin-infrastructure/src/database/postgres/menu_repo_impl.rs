// ============================================================================
// Admin Infrastructure - PostgreSQL Menu Repository
// File: crates/admin-infrastructure/src/database/postgres/menu_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use admin_core::domain::{MenuId, MenuNode, MenuPatch, NewMenuNode};
use admin_core::error::DomainError;
use admin_core::repositories::{prepare_create, prepare_update, MenuRepository};
use admin_shared::TreeStrategy;

use super::menu_rows::{self, db_err};
use super::{adjacency, closure};

/// Menu tree on PostgreSQL. Both strategies share the `menus` table; the
/// closure strategy also keeps `menu_closure` in step inside each write
/// transaction.
pub struct PgMenuRepository {
    pool: PgPool,
    strategy: TreeStrategy,
}

impl PgMenuRepository {
    pub fn new(pool: PgPool, strategy: TreeStrategy) -> Self {
        Self { pool, strategy }
    }

    /// Rebuilds `menu_closure` from `menus.parent_id`, for switching a
    /// database over from the adjacency strategy.
    pub async fn rebuild_closure(&self) -> Result<u64, DomainError> {
        let mut tx = menu_rows::begin(&self.pool).await?;
        let rows = closure::rebuild(&mut tx).await?;
        menu_rows::commit(tx).await?;
        info!("Menu closure rebuilt: {} row(s)", rows);
        Ok(rows)
    }

    async fn subtree(&self, conn: &mut PgConnection, id: MenuId) -> Result<Vec<MenuId>, DomainError> {
        match self.strategy {
            TreeStrategy::Adjacency => adjacency::descendant_ids(conn, id).await,
            TreeStrategy::Closure => closure::descendant_ids(conn, id).await,
        }
    }

    /// Whether `candidate` is `id` itself or sits anywhere below it.
    async fn is_within(
        &self,
        conn: &mut PgConnection,
        id: MenuId,
        candidate: MenuId,
    ) -> Result<bool, DomainError> {
        if candidate == id {
            return Ok(true);
        }
        match self.strategy {
            TreeStrategy::Adjacency => Ok(adjacency::descendant_ids(conn, id).await?.contains(&candidate)),
            TreeStrategy::Closure => closure::contains(conn, id, candidate).await,
        }
    }
}

#[async_trait]
impl MenuRepository for PgMenuRepository {
    fn strategy(&self) -> TreeStrategy {
        self.strategy
    }

    async fn list_all(&self) -> Result<Vec<MenuNode>, DomainError> {
        menu_rows::list_all(&self.pool).await
    }

    async fn find_by_id(&self, id: MenuId) -> Result<Option<MenuNode>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_err("Failed to acquire connection", e))?;
        menu_rows::find_by_id(&mut conn, id).await
    }

    async fn descendant_ids(&self, id: MenuId) -> Result<Vec<MenuId>, DomainError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| db_err("Failed to acquire connection", e))?;
        if !menu_rows::exists(&mut conn, id).await? {
            return Err(DomainError::MenuNotFound(id));
        }
        self.subtree(&mut conn, id).await
    }

    async fn create(&self, input: NewMenuNode) -> Result<MenuId, DomainError> {
        let input = prepare_create(input)?;
        let mut tx = menu_rows::begin(&self.pool).await?;

        if let Some(parent_id) = input.parent_id {
            if !menu_rows::exists(&mut tx, parent_id).await? {
                return Err(DomainError::parent_not_found(parent_id));
            }
        }

        let id = menu_rows::insert(&mut tx, &input).await?;
        if self.strategy == TreeStrategy::Closure {
            closure::link(&mut tx, id, input.parent_id).await?;
        }

        menu_rows::commit(tx).await?;
        info!("Menu stored: {} ({:?})", id, self.strategy);
        Ok(id)
    }

    async fn update(&self, id: MenuId, patch: MenuPatch) -> Result<(), DomainError> {
        let mut tx = menu_rows::begin(&self.pool).await?;

        let current = menu_rows::find_by_id(&mut tx, id)
            .await?
            .ok_or(DomainError::MenuNotFound(id))?;
        let new_parent = patch.moves(&current);

        if let Some(Some(parent_id)) = new_parent {
            if parent_id == id {
                warn!("Rejected self-parent move for menu {}", id);
                return Err(DomainError::Cycle { node: id, parent: parent_id });
            }
            if !menu_rows::exists(&mut tx, parent_id).await? {
                return Err(DomainError::parent_not_found(parent_id));
            }
            if self.is_within(&mut tx, id, parent_id).await? {
                warn!("Rejected move of menu {} under its descendant {}", id, parent_id);
                return Err(DomainError::Cycle { node: id, parent: parent_id });
            }
        }

        let next = prepare_update(&current, &patch)?;
        menu_rows::write(&mut tx, &next).await?;

        if let (Some(parent_id), TreeStrategy::Closure) = (new_parent, self.strategy) {
            closure::relink(&mut tx, id, parent_id).await?;
        }

        menu_rows::commit(tx).await
    }

    async fn delete(&self, id: MenuId, cascade: bool) -> Result<Vec<MenuId>, DomainError> {
        let mut tx = menu_rows::begin(&self.pool).await?;

        if !menu_rows::exists(&mut tx, id).await? {
            return Err(DomainError::MenuNotFound(id));
        }

        let children = menu_rows::child_count(&mut tx, id).await?;
        if children > 0 && !cascade {
            return Err(DomainError::HasChildren { id, children });
        }

        let mut removed = vec![id];
        if children > 0 {
            removed.extend(self.subtree(&mut tx, id).await?);
        }

        // Closure rows and role grants follow through ON DELETE CASCADE.
        menu_rows::delete_ids(&mut tx, &removed).await?;
        menu_rows::commit(tx).await?;
        Ok(removed)
    }
}
