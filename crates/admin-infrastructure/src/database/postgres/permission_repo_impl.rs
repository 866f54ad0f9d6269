// ============================================================================
// Admin Infrastructure - PostgreSQL Permission Repository
// File: crates/admin-infrastructure/src/database/postgres/permission_repo_impl.rs
// ============================================================================

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use admin_core::domain::{MenuId, PermissionAssignment, RoleId};
use admin_core::error::DomainError;
use admin_core::repositories::PermissionRepository;

use super::menu_rows::db_err;

pub struct PgPermissionRepository {
    pool: PgPool,
}

impl PgPermissionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PermissionRepository for PgPermissionRepository {
    async fn find_by_role(&self, role_id: RoleId) -> Result<PermissionAssignment, DomainError> {
        let rows: Vec<(i64,)> = sqlx::query_as(
            r#"
            SELECT menu_id FROM role_menus WHERE role_id = $1 ORDER BY menu_id
            "#,
        )
        .bind(role_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("Database error loading role menus", e))?;

        Ok(PermissionAssignment::new(
            role_id,
            rows.into_iter().map(|(id,)| MenuId(id)),
        ))
    }

    async fn replace(&self, assignment: PermissionAssignment) -> Result<(), DomainError> {
        let menu_ids: Vec<i64> = assignment.menu_ids.iter().map(|id| id.0).collect();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_err("Failed to start transaction", e))?;

        sqlx::query("DELETE FROM role_menus WHERE role_id = $1")
            .bind(assignment.role_id.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| db_err("Database error clearing role menus", e))?;

        sqlx::query(
            r#"
            INSERT INTO role_menus (role_id, menu_id)
            SELECT $1, menu_id FROM UNNEST($2::BIGINT[]) AS granted (menu_id)
            "#,
        )
        .bind(assignment.role_id.0)
        .bind(&menu_ids)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Database error saving role menus", e))?;

        tx.commit()
            .await
            .map_err(|e| db_err("Failed to commit transaction", e))?;

        info!(
            "Role {} now holds {} menu grant(s)",
            assignment.role_id,
            menu_ids.len()
        );
        Ok(())
    }

    async fn remove_menus(&self, menu_ids: Vec<MenuId>) -> Result<(), DomainError> {
        if menu_ids.is_empty() {
            return Ok(());
        }
        let raw: Vec<i64> = menu_ids.iter().map(|id| id.0).collect();

        sqlx::query("DELETE FROM role_menus WHERE menu_id = ANY($1)")
            .bind(&raw)
            .execute(&self.pool)
            .await
            .map_err(|e| db_err("Database error removing role menus", e))?;

        Ok(())
    }
}
