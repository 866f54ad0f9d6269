// ============================================================================
// Admin Infrastructure - Menu Closure Table
// File: crates/admin-infrastructure/src/database/postgres/closure.rs
// Description: Maintenance of menu_closure(ancestor_id, descendant_id, depth)
// ============================================================================
//! Every node has a `depth = 0` self row plus one row per strict ancestor.
//! All functions run inside the caller's transaction.

use sqlx::PgConnection;

use admin_core::domain::MenuId;
use admin_core::error::DomainError;

use super::menu_rows::db_err;

pub(crate) async fn descendant_ids(conn: &mut PgConnection, id: MenuId) -> Result<Vec<MenuId>, DomainError> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"
        SELECT descendant_id
        FROM menu_closure
        WHERE ancestor_id = $1 AND depth > 0
        ORDER BY depth, descendant_id
        "#,
    )
    .bind(id.0)
    .fetch_all(conn)
    .await
    .map_err(|e| db_err("Database error reading menu closure", e))?;

    Ok(rows.into_iter().map(|(id,)| MenuId(id)).collect())
}

/// Whether `ancestor` is `descendant` or one of its ancestors.
pub(crate) async fn contains(
    conn: &mut PgConnection,
    ancestor: MenuId,
    descendant: MenuId,
) -> Result<bool, DomainError> {
    let (found,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM menu_closure WHERE ancestor_id = $1 AND descendant_id = $2
        )
        "#,
    )
    .bind(ancestor.0)
    .bind(descendant.0)
    .fetch_one(conn)
    .await
    .map_err(|e| db_err("Database error reading menu closure", e))?;

    Ok(found)
}

/// Rows for a freshly inserted leaf.
pub(crate) async fn link(
    conn: &mut PgConnection,
    id: MenuId,
    parent_id: Option<MenuId>,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        INSERT INTO menu_closure (ancestor_id, descendant_id, depth)
        SELECT ancestor_id, $1, depth + 1 FROM menu_closure WHERE descendant_id = $2
        UNION ALL
        SELECT $1, $1, 0
        "#,
    )
    .bind(id.0)
    .bind(parent_id.map(|p| p.0))
    .execute(conn)
    .await
    .map_err(|e| db_err("Database error linking menu closure", e))?;

    Ok(())
}

/// Detaches the subtree under `id` from its old ancestors and hangs it under
/// `new_parent`. Rows inside the subtree are untouched.
pub(crate) async fn relink(
    conn: &mut PgConnection,
    id: MenuId,
    new_parent: Option<MenuId>,
) -> Result<(), DomainError> {
    sqlx::query(
        r#"
        DELETE FROM menu_closure
        WHERE descendant_id IN (SELECT descendant_id FROM menu_closure WHERE ancestor_id = $1)
          AND ancestor_id NOT IN (SELECT descendant_id FROM menu_closure WHERE ancestor_id = $1)
        "#,
    )
    .bind(id.0)
    .execute(&mut *conn)
    .await
    .map_err(|e| db_err("Database error detaching menu subtree", e))?;

    let Some(parent_id) = new_parent else {
        return Ok(());
    };

    sqlx::query(
        r#"
        INSERT INTO menu_closure (ancestor_id, descendant_id, depth)
        SELECT above.ancestor_id, below.descendant_id, above.depth + below.depth + 1
        FROM menu_closure above
        CROSS JOIN menu_closure below
        WHERE above.descendant_id = $2 AND below.ancestor_id = $1
        "#,
    )
    .bind(id.0)
    .bind(parent_id.0)
    .execute(conn)
    .await
    .map_err(|e| db_err("Database error attaching menu subtree", e))?;

    Ok(())
}

/// Recomputes the whole index from `menus.parent_id`. Returns the row count.
pub(crate) async fn rebuild(conn: &mut PgConnection) -> Result<u64, DomainError> {
    sqlx::query("DELETE FROM menu_closure")
        .execute(&mut *conn)
        .await
        .map_err(|e| db_err("Database error clearing menu closure", e))?;

    let result = sqlx::query(
        r#"
        INSERT INTO menu_closure (ancestor_id, descendant_id, depth)
        WITH RECURSIVE paths (ancestor_id, descendant_id, depth) AS (
            SELECT id, id, 0 FROM menus
            UNION ALL
            SELECT p.ancestor_id, m.id, p.depth + 1
            FROM paths p
            JOIN menus m ON m.parent_id = p.descendant_id
            WHERE p.depth < (SELECT COUNT(*) FROM menus)
        )
        SELECT ancestor_id, descendant_id, MIN(depth)
        FROM paths
        GROUP BY ancestor_id, descendant_id
        "#,
    )
    .execute(conn)
    .await
    .map_err(|e| db_err("Database error rebuilding menu closure", e))?;

    Ok(result.rows_affected())
}
