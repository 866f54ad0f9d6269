//! Adjacency-list queries: the tree lives only in `menus.parent_id`.

use sqlx::PgConnection;

use admin_core::domain::MenuId;
use admin_core::error::DomainError;

use super::menu_rows::db_err;

/// Strict descendants of `id`, shallowest first, walked with a recursive
/// CTE. The walk stops once it is deeper than the table is long, so a stored
/// loop cannot recurse forever.
pub(crate) async fn descendant_ids(conn: &mut PgConnection, id: MenuId) -> Result<Vec<MenuId>, DomainError> {
    let rows: Vec<(i64,)> = sqlx::query_as(
        r#"
        WITH RECURSIVE subtree (id, depth) AS (
            SELECT id, 1 FROM menus WHERE parent_id = $1 AND id <> $1
            UNION ALL
            SELECT m.id, s.depth + 1
            FROM menus m
            JOIN subtree s ON m.parent_id = s.id
            WHERE m.id <> s.id AND s.depth < (SELECT COUNT(*) FROM menus)
        )
        SELECT id FROM subtree
        WHERE id <> $1
        GROUP BY id
        ORDER BY MIN(depth), id
        "#,
    )
    .bind(id.0)
    .fetch_all(conn)
    .await
    .map_err(|e| db_err("Database error walking menu subtree", e))?;

    Ok(rows.into_iter().map(|(id,)| MenuId(id)).collect())
}
