// ============================================================================
// Admin Infrastructure - Shared Menu Row Access
// File: crates/admin-infrastructure/src/database/postgres/menu_rows.rs
// Description: Row mapping and statements both tree strategies run on `menus`
// ============================================================================

use sqlx::{FromRow, PgConnection, PgPool, Postgres, Transaction};
use tracing::error;

use admin_core::domain::{MenuId, MenuNode, MenuType, NewMenuNode};
use admin_core::error::DomainError;

/// Transaction-scoped lock serializing structural writes on the menu tree.
const MENU_TREE_LOCK: i64 = 0x4d45_4e55;

#[derive(Debug, FromRow)]
pub(crate) struct MenuRow {
    pub id: i64,
    pub parent_id: Option<i64>,
    pub menu_type: String,
    pub label: String,
    pub path: Option<String>,
    pub component: Option<String>,
    pub icon: Option<String>,
    pub code: Option<String>,
    pub sort_order: Option<i32>,
}

impl TryFrom<MenuRow> for MenuNode {
    type Error = DomainError;

    fn try_from(row: MenuRow) -> Result<Self, Self::Error> {
        let menu_type = MenuType::from_db_value(&row.menu_type).ok_or_else(|| {
            DomainError::InternalError(format!(
                "menu {} has unknown type '{}'",
                row.id, row.menu_type
            ))
        })?;

        Ok(MenuNode {
            id: MenuId(row.id),
            parent_id: row.parent_id.map(MenuId),
            menu_type,
            label: row.label,
            path: row.path,
            component: row.component,
            icon: row.icon,
            code: row.code,
            sort_order: row.sort_order,
        })
    }
}

pub(crate) fn db_err(context: &'static str, err: sqlx::Error) -> DomainError {
    error!("{}: {}", context, err);
    DomainError::DatabaseError(err.to_string())
}

pub(crate) async fn begin(pool: &PgPool) -> Result<Transaction<'static, Postgres>, DomainError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| db_err("Failed to start transaction", e))?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(MENU_TREE_LOCK)
        .execute(&mut *tx)
        .await
        .map_err(|e| db_err("Failed to lock menu tree", e))?;

    Ok(tx)
}

pub(crate) async fn commit(tx: Transaction<'static, Postgres>) -> Result<(), DomainError> {
    tx.commit()
        .await
        .map_err(|e| db_err("Failed to commit transaction", e))
}

pub(crate) async fn list_all(pool: &PgPool) -> Result<Vec<MenuNode>, DomainError> {
    let rows: Vec<MenuRow> = sqlx::query_as(
        r#"
        SELECT id, parent_id, menu_type, label, path, component, icon, code, sort_order
        FROM menus
        ORDER BY id
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| db_err("Database error listing menus", e))?;

    rows.into_iter().map(MenuNode::try_from).collect()
}

pub(crate) async fn find_by_id(
    conn: &mut PgConnection,
    id: MenuId,
) -> Result<Option<MenuNode>, DomainError> {
    let row: Option<MenuRow> = sqlx::query_as(
        r#"
        SELECT id, parent_id, menu_type, label, path, component, icon, code, sort_order
        FROM menus
        WHERE id = $1
        "#,
    )
    .bind(id.0)
    .fetch_optional(conn)
    .await
    .map_err(|e| db_err("Database error finding menu by id", e))?;

    row.map(MenuNode::try_from).transpose()
}

pub(crate) async fn exists(conn: &mut PgConnection, id: MenuId) -> Result<bool, DomainError> {
    let (found,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM menus WHERE id = $1)")
        .bind(id.0)
        .fetch_one(conn)
        .await
        .map_err(|e| db_err("Database error checking menu", e))?;

    Ok(found)
}

/// Direct children of `id`. A legacy self-parent row is not its own child.
pub(crate) async fn child_count(conn: &mut PgConnection, id: MenuId) -> Result<usize, DomainError> {
    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM menus WHERE parent_id = $1 AND id <> $1")
        .bind(id.0)
        .fetch_one(conn)
        .await
        .map_err(|e| db_err("Database error counting child menus", e))?;

    Ok(usize::try_from(count).unwrap_or_default())
}

pub(crate) async fn insert(conn: &mut PgConnection, input: &NewMenuNode) -> Result<MenuId, DomainError> {
    let (id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO menus (parent_id, menu_type, label, path, component, icon, code, sort_order)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        RETURNING id
        "#,
    )
    .bind(input.parent_id.map(|p| p.0))
    .bind(input.menu_type.as_db_value())
    .bind(&input.label)
    .bind(&input.path)
    .bind(&input.component)
    .bind(&input.icon)
    .bind(&input.code)
    .bind(input.sort_order)
    .fetch_one(conn)
    .await
    .map_err(|e| db_err("Database error creating menu", e))?;

    Ok(MenuId(id))
}

/// Writes every field of `node` over its stored row.
pub(crate) async fn write(conn: &mut PgConnection, node: &MenuNode) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        UPDATE menus
        SET parent_id = $2, menu_type = $3, label = $4, path = $5,
            component = $6, icon = $7, code = $8, sort_order = $9,
            modified_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(node.id.0)
    .bind(node.parent_id.map(|p| p.0))
    .bind(node.menu_type.as_db_value())
    .bind(&node.label)
    .bind(&node.path)
    .bind(&node.component)
    .bind(&node.icon)
    .bind(&node.code)
    .bind(node.sort_order)
    .execute(conn)
    .await
    .map_err(|e| db_err("Database error updating menu", e))?;

    Ok(())
}

pub(crate) async fn delete_ids(conn: &mut PgConnection, ids: &[MenuId]) -> Result<(), DomainError> {
    let raw: Vec<i64> = ids.iter().map(|id| id.0).collect();
    sqlx::query("DELETE FROM menus WHERE id = ANY($1)")
        .bind(raw)
        .execute(conn)
        .await
        .map_err(|e| db_err("Database error deleting menus", e))?;

    Ok(())
}
