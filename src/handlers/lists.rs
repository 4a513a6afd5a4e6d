/// Shopping-list handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::db;
use crate::error::{AppError, Result};
use crate::handlers::SearchParams;
use crate::middleware::AuthedUser;
use crate::models::NewListRequest;

/// List the caller's shopping lists, with optional search and pagination
/// GET /shoppinglists?q=&page=&per_page=
pub async fn list_lists(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    user: AuthedUser,
    params: web::Query<SearchParams>,
) -> Result<HttpResponse> {
    let page = db::lists::search(
        &pool,
        user.0,
        params.query(),
        params.page(),
        params.per_page(config.pagination.page_size),
    )
    .await?;

    Ok(HttpResponse::Ok().json(page))
}

/// Create a shopping list
/// POST /shoppinglists
pub async fn create_list(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    req: web::Json<NewListRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let list = db::lists::create_list(&pool, user.0, req.name.trim()).await?;

    tracing::info!(user_id = %user.0, list_id = %list.id, "list created");

    Ok(HttpResponse::Created().json(list))
}

/// Rename a shopping list
/// PUT /shoppinglists/{id}
pub async fn update_list(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    path: web::Path<Uuid>,
    req: web::Json<NewListRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let list = db::lists::rename(&pool, user.0, *path, req.name.trim())
        .await?
        .ok_or(AppError::NotFound("Requested list was not found".to_string()))?;

    Ok(HttpResponse::Ok().json(list))
}

/// Delete a shopping list and all its items
/// DELETE /shoppinglists/{id}
pub async fn delete_list(
    pool: web::Data<PgPool>,
    user: AuthedUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse> {
    let deleted = db::lists::delete(&pool, user.0, *path).await?;

    if !deleted {
        return Err(AppError::NotFound("Requested list was not found".to_string()));
    }

    tracing::info!(user_id = %user.0, list_id = %path, "list deleted");

    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Success" })))
}
