/// Item repository, scoped to a single list
///
/// Callers resolve list ownership first (`lists::find_by_id`); everything
/// here filters by `list_id`.
use crate::error::{AppError, Result};
use crate::models::{Item, ItemPage};
use sqlx::PgPool;
use uuid::Uuid;

use super::{page_offset, total_pages};

/// Add an item; duplicate names within the list are rejected
pub async fn add_item(
    pool: &PgPool,
    list_id: Uuid,
    name: &str,
    quantity: i32,
) -> Result<Item> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM items WHERE list_id = $1 AND LOWER(name) = LOWER($2))",
    )
    .bind(list_id)
    .bind(name)
    .fetch_one(pool)
    .await?;

    if exists {
        return Err(AppError::Conflict(
            "An item with this name is already on the list".to_string(),
        ));
    }

    let item = sqlx::query_as::<_, Item>(
        r#"
        INSERT INTO items (name, quantity, list_id)
        VALUES ($1, $2, $3)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(quantity)
    .bind(list_id)
    .fetch_one(pool)
    .await?;

    Ok(item)
}

/// Search a list's items with case-insensitive substring matching
pub async fn search(
    pool: &PgPool,
    list_id: Uuid,
    query: Option<&str>,
    page: i64,
    per_page: i64,
) -> Result<ItemPage> {
    let pattern = query.map(|q| format!("%{}%", q.trim()));

    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM items
        WHERE list_id = $1
          AND ($2::text IS NULL OR name ILIKE $2)
        "#,
    )
    .bind(list_id)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let items = sqlx::query_as::<_, Item>(
        r#"
        SELECT * FROM items
        WHERE list_id = $1
          AND ($2::text IS NULL OR name ILIKE $2)
        ORDER BY created_at
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(list_id)
    .bind(&pattern)
    .bind(per_page)
    .bind(page_offset(page, per_page))
    .fetch_all(pool)
    .await?;

    Ok(ItemPage {
        items,
        total_pages: total_pages(count, per_page),
    })
}

/// Partial update: only supplied fields change
pub async fn update_item(
    pool: &PgPool,
    list_id: Uuid,
    item_id: Uuid,
    name: Option<&str>,
    quantity: Option<i32>,
) -> Result<Option<Item>> {
    let item = sqlx::query_as::<_, Item>(
        r#"
        UPDATE items
        SET name = COALESCE($3::varchar, name),
            quantity = COALESCE($4::int, quantity),
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $2 AND list_id = $1
        RETURNING *
        "#,
    )
    .bind(list_id)
    .bind(item_id)
    .bind(name)
    .bind(quantity)
    .fetch_optional(pool)
    .await?;

    Ok(item)
}

/// Delete an item; returns false when the list has no such item
pub async fn delete_item(pool: &PgPool, list_id: Uuid, item_id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM items WHERE id = $2 AND list_id = $1")
        .bind(list_id)
        .bind(item_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
