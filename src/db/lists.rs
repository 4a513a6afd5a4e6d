/// Shopping-list repository: ownership-scoped CRUD, search, pagination
///
/// Every query filters by the owning user id, so a list belonging to another
/// user is indistinguishable from a missing one.
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::{ListPage, ShoppingList};
use sqlx::PgPool;
use uuid::Uuid;

use super::{page_offset, total_pages};

/// Create a list for the owner; per-owner duplicate names are a conflict
pub async fn create_list(pool: &PgPool, owner: Uuid, name: &str) -> Result<ShoppingList> {
    let list = sqlx::query_as::<_, ShoppingList>(
        r#"
        INSERT INTO shopping_lists (name, user_id)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(name)
    .bind(owner)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "shopping_lists_owner_name_key") {
            AppError::Conflict("You already have a list with this name".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok(list)
}

/// Find a list owned by the given user
pub async fn find_by_id(pool: &PgPool, owner: Uuid, list_id: Uuid) -> Result<Option<ShoppingList>> {
    let list = sqlx::query_as::<_, ShoppingList>(
        "SELECT * FROM shopping_lists WHERE id = $1 AND user_id = $2",
    )
    .bind(list_id)
    .bind(owner)
    .fetch_optional(pool)
    .await?;

    Ok(list)
}

/// Search the owner's lists with case-insensitive substring matching
///
/// Pages are 1-indexed; an out-of-range page yields an empty set while
/// `total_pages` still reflects the full matching count.
pub async fn search(
    pool: &PgPool,
    owner: Uuid,
    query: Option<&str>,
    page: i64,
    per_page: i64,
) -> Result<ListPage> {
    let pattern = query.map(|q| format!("%{}%", q.trim()));

    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM shopping_lists
        WHERE user_id = $1
          AND ($2::text IS NULL OR name ILIKE $2)
        "#,
    )
    .bind(owner)
    .bind(&pattern)
    .fetch_one(pool)
    .await?;

    let lists = sqlx::query_as::<_, ShoppingList>(
        r#"
        SELECT * FROM shopping_lists
        WHERE user_id = $1
          AND ($2::text IS NULL OR name ILIKE $2)
        ORDER BY created_at
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(owner)
    .bind(&pattern)
    .bind(per_page)
    .bind(page_offset(page, per_page))
    .fetch_all(pool)
    .await?;

    Ok(ListPage {
        lists,
        total_pages: total_pages(count, per_page),
    })
}

/// Rename a list; returns None when the owner has no such list
pub async fn rename(
    pool: &PgPool,
    owner: Uuid,
    list_id: Uuid,
    name: &str,
) -> Result<Option<ShoppingList>> {
    let list = sqlx::query_as::<_, ShoppingList>(
        r#"
        UPDATE shopping_lists
        SET name = $3, updated_at = CURRENT_TIMESTAMP
        WHERE id = $1 AND user_id = $2
        RETURNING *
        "#,
    )
    .bind(list_id)
    .bind(owner)
    .bind(name)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "shopping_lists_owner_name_key") {
            AppError::Conflict("You already have a list with this name".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok(list)
}

/// Delete a list and all its items in one transaction
///
/// Items are removed before the list record so a crash between the two steps
/// cannot leave orphans; returns false when the owner has no such list.
pub async fn delete(pool: &PgPool, owner: Uuid, list_id: Uuid) -> Result<bool> {
    let mut tx = pool.begin().await?;

    let owned = sqlx::query_scalar::<_, Uuid>(
        "SELECT id FROM shopping_lists WHERE id = $1 AND user_id = $2",
    )
    .bind(list_id)
    .bind(owner)
    .fetch_optional(&mut *tx)
    .await?;

    if owned.is_none() {
        tx.rollback().await?;
        return Ok(false);
    }

    sqlx::query("DELETE FROM items WHERE list_id = $1")
        .bind(list_id)
        .execute(&mut *tx)
        .await?;

    sqlx::query("DELETE FROM shopping_lists WHERE id = $1")
        .bind(list_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(true)
}
