/// Route tree wiring, shared between the server binary and the tests
///
/// The auth guard wraps only the authenticated surface: logout and
/// everything under /shoppinglists. Register, login, and the password-reset
/// flow stay public.
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::handlers;
use crate::middleware::AuthMiddleware;

async fn health(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "shoppinglist-service",
            "version": env!("CARGO_PKG_VERSION"),
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
        })),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(
            web::scope("/auth")
                .route("/register", web::post().to(handlers::register))
                .route("/login", web::post().to(handlers::login))
                .route("/forgot-password", web::post().to(handlers::forgot_password))
                .route(
                    "/reset_password/{token}",
                    web::post().to(handlers::reset_password),
                )
                .service(
                    web::resource("/logout")
                        .wrap(AuthMiddleware)
                        .route(web::post().to(handlers::logout)),
                ),
        )
        .service(
            web::scope("/shoppinglists")
                .wrap(AuthMiddleware)
                .service(
                    web::resource("")
                        .route(web::get().to(handlers::list_lists))
                        .route(web::post().to(handlers::create_list)),
                )
                .service(
                    web::resource("/{list_id}")
                        .route(web::get().to(handlers::view_list))
                        .route(web::put().to(handlers::update_list))
                        .route(web::delete().to(handlers::delete_list)),
                )
                .service(web::resource("/{list_id}/items/").route(web::post().to(handlers::add_item)))
                .service(
                    web::resource("/{list_id}/items/{item_id}")
                        .route(web::put().to(handlers::update_item))
                        .route(web::delete().to(handlers::delete_item)),
                ),
        );
}
