/// Item handlers, all scoped to a list the caller owns
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::SearchParams;
use crate::middleware::AuthedUser;
use crate::models::{NewItemRequest, ShoppingList, UpdateItemRequest};

/// Resolve a list id to a list the caller owns, or 404
async fn owned_list(pool: &PgPool, user: AuthedUser, list_id: Uuid) -> Result<ShoppingList> {
    db::lists::find_by_id(pool, user.0, list_id)
        .await?
        .ok_or(AppError::NotFound("Requested list was not found".to_string()))
}

/// View a list's items, with optional search and pagination
/// GET /shoppinglists/{id}?q=&page=&per_page=
pub async fn view_list(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthedUser,
    path: web::Path<Uuid>,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    let list = owned_list(&pool, user, *path).await?;

    let page = db::items::search(
        &pool,
        list.id,
        params.query(),
        params.page(),
        params.per_page(config.pagination.page_size),
    )
    .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Add an item to a list
/// POST /shoppinglists/{id}/items/
pub async fn add_item(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    path: web::Path<Uuid>,
    req: web::Json<NewItemRequest>,
) -> Result<HttpResponse> {
    let list = owned_list(&pool, user, *path).await?;

    req.validate()?;

    let item =
        db::items::add_item(&pool, list.id, req.name.trim(), req.quantity.unwrap_or(1)).await?;

    tracing::info!(list_id = %list.id, item_id = %item.id, "item added");

    Ok(HttpResponse::Created().json(item))
}

/// Edit an item's name and/or quantity
/// PUT /shoppinglists/{id}/items/{item_id}
pub async fn update_item(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    path: web::Path<(Uuid, Uuid)>,
    req: web::Json<UpdateItemRequest>,
) -> Result<HttpResponse> {
    let (list_id, item_id) = path.into_inner();
    let list = owned_list(&pool, user, list_id).await?;

    req.validate()?;

    let item = db::items::update_item(
        &pool,
        list.id,
        item_id,
        req.name.as_deref().map(str::trim),
        req.quantity,
    )
    .await?
    .ok_or(AppError::NotFound("Requested item was not found".to_string()))?;

    Ok(HttpResponse::Ok().json(item))
}

/// Remove an item from a list
/// DELETE /shoppinglists/{id}/items/{item_id}
pub async fn delete_item(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse> {
    let (list_id, item_id) = path.into_inner();
    let list = owned_list(&pool, user, list_id).await?;

    let deleted = db::items::delete_item(&pool, list.id, item_id).await?;

    if !deleted {
        return Err(AppError::NotFound("Requested item was not found".to_string()));
    }

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Success" })))
}
