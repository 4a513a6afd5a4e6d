//! End-to-end API tests against a live PostgreSQL database.
//!
//! Requires `TEST_DATABASE_URL`; every test skips cleanly when it is unset
//! so the suite can run in environments without a database. Emails are
//! randomized per test so reruns do not need a teardown.

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::{test, web, App, Error};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use shoppinglist_service::config::{
    AppConfig, AuthConfig, Config, CorsConfig, DatabaseConfig, EmailConfig, PaginationConfig,
};
use shoppinglist_service::routes;
use shoppinglist_service::security::{PasswordService, TokenService};
use shoppinglist_service::services::EmailService;

fn test_config() -> Config {
    Config {
        app: AppConfig {
            env: "test".to_string(),
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        cors: CorsConfig {
            allowed_origins: "*".to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
        },
        auth: AuthConfig {
            secret_key: "not_really_secret".to_string(),
            auth_token_ttl_secs: 10_800,
            reset_token_ttl_secs: 3_600,
            // Small work factor to keep the suite fast
            hash_memory_kib: 1024,
            hash_iterations: 1,
            hash_parallelism: 1,
        },
        email: EmailConfig {
            smtp_host: String::new(),
            smtp_port: 587,
            smtp_username: None,
            smtp_password: None,
            smtp_from: "no-reply@localhost".to_string(),
            password_reset_base_url: "http://localhost:8080".to_string(),
        },
        pagination: PaginationConfig { page_size: 7 },
    }
}

async fn test_pool() -> Option<PgPool> {
    let url = match std::env::var("TEST_DATABASE_URL") {
        Ok(url) => url,
        Err(_) => {
            eprintln!("TEST_DATABASE_URL not set; skipping");
            return None;
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await
        .expect("connect postgres");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("run migrations");

    Some(pool)
}

macro_rules! test_app {
    ($pool:expr) => {{
        let config = test_config();
        test::init_service(
            App::new()
                .app_data(web::Data::new($pool.clone()))
                .app_data(web::Data::new(config.clone()))
                .app_data(web::Data::new(TokenService::new(
                    &config.auth.secret_key,
                    config.auth.auth_token_ttl_secs,
                    config.auth.reset_token_ttl_secs,
                )))
                .app_data(web::Data::new(
                    PasswordService::new(&config.auth).expect("password service"),
                ))
                .app_data(web::Data::new(
                    EmailService::new(&config.email).expect("email service"),
                ))
                .configure(routes::configure),
        )
        .await
    }};
}

async fn send_json<S, B>(
    app: &S,
    method: test::TestRequest,
    uri: &str,
    body: Option<serde_json::Value>,
    token: Option<&str>,
) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let mut req = method.uri(uri);
    if let Some(body) = body {
        req = req.set_json(body);
    }
    if let Some(token) = token {
        req = req.insert_header(("Authorization", format!("Bearer {}", token)));
    }
    test::call_service(app, req.to_request()).await
}

async fn register<S, B>(app: &S, email: &str, password: &str) -> ServiceResponse<B>
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    send_json(
        app,
        test::TestRequest::post(),
        "/auth/register",
        Some(serde_json::json!({
            "email": email,
            "password": password,
            "confirm": password,
        })),
        None,
    )
    .await
}

async fn login_token<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    let resp = send_json(
        app,
        test::TestRequest::post(),
        "/auth/login",
        Some(serde_json::json!({ "email": email, "password": password })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = test::read_body_json(resp).await;
    body["token"].as_str().expect("token in login response").to_string()
}

fn unique_email() -> String {
    format!("user-{}@example.com", Uuid::new_v4())
}

#[actix_web::test]
async fn register_login_and_full_list_lifecycle() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    // register -> 201, duplicate -> conflict
    let resp = register(&app, &email, "pw1").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = register(&app, &email, "pw1").await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let token = login_token(&app, &email, "pw1").await;

    // create a list
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "Groceries" })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let list: serde_json::Value = test::read_body_json(resp).await;
    let list_id = list["id"].as_str().expect("list id").to_string();

    // add an item
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/shoppinglists/{}/items/", list_id),
        Some(serde_json::json!({ "name": "Milk" })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let item: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(item["quantity"], 1);
    let item_id = item["id"].as_str().expect("item id").to_string();

    // delete the list, cascade removes the item
    let resp = send_json(
        &app,
        test::TestRequest::delete(),
        &format!("/shoppinglists/{}", list_id),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send_json(
        &app,
        test::TestRequest::get(),
        &format!("/shoppinglists/{}", list_id),
        None,
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send_json(
        &app,
        test::TestRequest::put(),
        &format!("/shoppinglists/{}/items/{}", list_id, item_id),
        Some(serde_json::json!({ "quantity": 2 })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // no orphaned rows survive the cascade
    let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE list_id = $1")
        .bind(Uuid::parse_str(&list_id).expect("uuid"))
        .fetch_one(&pool)
        .await
        .expect("count items");
    assert_eq!(orphans, 0);
}

#[actix_web::test]
async fn login_failures() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    register(&app, &email, "pw1").await;

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/login",
        Some(serde_json::json!({ "email": email, "password": "wrong" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/login",
        Some(serde_json::json!({ "email": unique_email(), "password": "pw1" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/login",
        Some(serde_json::json!({ "email": "not-an-email", "password": "pw1" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[actix_web::test]
async fn logout_revokes_an_unexpired_token() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    register(&app, &email, "pw1").await;
    let token = login_token(&app, &email, "pw1").await;

    let resp = send_json(&app, test::TestRequest::get(), "/shoppinglists", None, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send_json(&app, test::TestRequest::post(), "/auth/logout", None, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // The token is still cryptographically valid but no longer stored
    let resp = send_json(&app, test::TestRequest::get(), "/shoppinglists", None, Some(&token)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn a_new_login_replaces_the_previous_token() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    register(&app, &email, "pw1").await;
    let first = login_token(&app, &email, "pw1").await;
    // Issued tokens embed the issue timestamp; wait so the second differs.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let second = login_token(&app, &email, "pw1").await;
    assert_ne!(first, second);

    let resp = send_json(&app, test::TestRequest::get(), "/shoppinglists", None, Some(&first)).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send_json(&app, test::TestRequest::get(), "/shoppinglists", None, Some(&second)).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn missing_or_malformed_credentials_are_unauthorized() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);

    let resp = send_json(&app, test::TestRequest::get(), "/shoppinglists", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/shoppinglists")
            .insert_header(("Authorization", "Basic abc"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = send_json(&app, test::TestRequest::get(), "/shoppinglists", None, Some("garbage")).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn validation_failures_do_not_persist_rows() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    // mismatched confirm
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/register",
        Some(serde_json::json!({ "email": email, "password": "pw1", "confirm": "pw2" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    register(&app, &email, "pw1").await;
    let token = login_token(&app, &email, "pw1").await;

    // blank list name
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "  " })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body: serde_json::Value = send_and_read(&app, "/shoppinglists", &token).await;
    assert_eq!(body["lists"].as_array().expect("lists array").len(), 0);
    assert_eq!(body["total_pages"], 0);

    // blank item name and non-positive quantity
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "Groceries" })),
        Some(&token),
    )
    .await;
    let list: serde_json::Value = test::read_body_json(resp).await;
    let list_id = list["id"].as_str().expect("list id").to_string();

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/shoppinglists/{}/items/", list_id),
        Some(serde_json::json!({ "name": "" })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/shoppinglists/{}/items/", list_id),
        Some(serde_json::json!({ "name": "Milk", "quantity": 0 })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items WHERE list_id = $1")
        .bind(Uuid::parse_str(&list_id).expect("uuid"))
        .fetch_one(&pool)
        .await
        .expect("count items");
    assert_eq!(count, 0);
}

async fn send_and_read<S, B>(app: &S, uri: &str, token: &str) -> serde_json::Value
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
    B::Error: std::fmt::Debug,
{
    let resp = send_json(app, test::TestRequest::get(), uri, None, Some(token)).await;
    assert_eq!(resp.status(), StatusCode::OK);
    test::read_body_json(resp).await
}

#[actix_web::test]
async fn search_and_pagination_math() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    register(&app, &email, "pw1").await;
    let token = login_token(&app, &email, "pw1").await;

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "Pantry" })),
        Some(&token),
    )
    .await;
    let list: serde_json::Value = test::read_body_json(resp).await;
    let list_id = list["id"].as_str().expect("list id").to_string();

    for n in 1..=15 {
        let resp = send_json(
            &app,
            test::TestRequest::post(),
            &format!("/shoppinglists/{}/items/", list_id),
            Some(serde_json::json!({ "name": format!("Item {:02}", n) })),
            Some(&token),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    // 15 matching items, page size 7 -> 3 pages
    let body = send_and_read(&app, &format!("/shoppinglists/{}?per_page=7", list_id), &token).await;
    assert_eq!(body["total_pages"], 3);
    assert_eq!(body["items"].as_array().expect("items").len(), 7);

    let body =
        send_and_read(&app, &format!("/shoppinglists/{}?per_page=7&page=3", list_id), &token).await;
    assert_eq!(body["items"].as_array().expect("items").len(), 1);

    // out-of-range page: empty set, true total
    let body =
        send_and_read(&app, &format!("/shoppinglists/{}?per_page=7&page=9", list_id), &token).await;
    assert_eq!(body["items"].as_array().expect("items").len(), 0);
    assert_eq!(body["total_pages"], 3);

    // case-insensitive substring search
    let body =
        send_and_read(&app, &format!("/shoppinglists/{}?q=item%200&per_page=7", list_id), &token)
            .await;
    assert_eq!(body["items"].as_array().expect("items").len(), 7);
    assert_eq!(body["total_pages"], 2);

    let body = send_and_read(&app, &format!("/shoppinglists/{}?q=nothing", list_id), &token).await;
    assert_eq!(body["items"].as_array().expect("items").len(), 0);
    assert_eq!(body["total_pages"], 0);
}

#[actix_web::test]
async fn lists_are_scoped_to_their_owner() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let (owner, intruder) = (unique_email(), unique_email());

    register(&app, &owner, "pw1").await;
    register(&app, &intruder, "pw2").await;
    let owner_token = login_token(&app, &owner, "pw1").await;
    let intruder_token = login_token(&app, &intruder, "pw2").await;

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "Private" })),
        Some(&owner_token),
    )
    .await;
    let list: serde_json::Value = test::read_body_json(resp).await;
    let list_id = list["id"].as_str().expect("list id").to_string();

    // the intruder cannot see, rename, or delete the owner's list
    let resp = send_json(
        &app,
        test::TestRequest::get(),
        &format!("/shoppinglists/{}", list_id),
        None,
        Some(&intruder_token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send_json(
        &app,
        test::TestRequest::put(),
        &format!("/shoppinglists/{}", list_id),
        Some(serde_json::json!({ "name": "Taken over" })),
        Some(&intruder_token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send_json(
        &app,
        test::TestRequest::delete(),
        &format!("/shoppinglists/{}", list_id),
        None,
        Some(&intruder_token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // both users can hold a list with the same name; a second list with the
    // same name for the same owner is a conflict
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "Private" })),
        Some(&intruder_token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "Private" })),
        Some(&owner_token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn item_updates_are_partial() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    register(&app, &email, "pw1").await;
    let token = login_token(&app, &email, "pw1").await;

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/shoppinglists",
        Some(serde_json::json!({ "name": "Groceries" })),
        Some(&token),
    )
    .await;
    let list: serde_json::Value = test::read_body_json(resp).await;
    let list_id = list["id"].as_str().expect("list id").to_string();

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/shoppinglists/{}/items/", list_id),
        Some(serde_json::json!({ "name": "Milk", "quantity": 2 })),
        Some(&token),
    )
    .await;
    let item: serde_json::Value = test::read_body_json(resp).await;
    let item_id = item["id"].as_str().expect("item id").to_string();

    // quantity-only update leaves the name untouched
    let resp = send_json(
        &app,
        test::TestRequest::put(),
        &format!("/shoppinglists/{}/items/{}", list_id, item_id),
        Some(serde_json::json!({ "quantity": 5 })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let item: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(item["name"], "Milk");
    assert_eq!(item["quantity"], 5);

    // name-only update leaves the quantity untouched
    let resp = send_json(
        &app,
        test::TestRequest::put(),
        &format!("/shoppinglists/{}/items/{}", list_id, item_id),
        Some(serde_json::json!({ "name": "Bread" })),
        Some(&token),
    )
    .await;
    let item: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(item["name"], "Bread");
    assert_eq!(item["quantity"], 5);

    // duplicate item names within a list are rejected case-insensitively
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/shoppinglists/{}/items/", list_id),
        Some(serde_json::json!({ "name": "bread" })),
        Some(&token),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn password_reset_flow() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    register(&app, &email, "pw1").await;

    // forgot-password: 200 for a known email, 404 otherwise
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/forgot-password",
        Some(serde_json::json!({ "email": email })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/forgot-password",
        Some(serde_json::json!({ "email": unique_email() })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // reset with a valid token issued under the same secret
    let config = test_config();
    let tokens = TokenService::new(
        &config.auth.secret_key,
        config.auth.auth_token_ttl_secs,
        config.auth.reset_token_ttl_secs,
    );
    let reset_token = tokens.issue_reset_token(&email).expect("reset token");

    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/auth/reset_password/{}", reset_token),
        Some(serde_json::json!({ "new_password": "pw2", "confirm": "pw2" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);

    // the old password no longer works; the new one does
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/login",
        Some(serde_json::json!({ "email": email, "password": "pw1" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    login_token(&app, &email, "pw2").await;

    // garbage and expired tokens are rejected with 401
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        "/auth/reset_password/garbage",
        Some(serde_json::json!({ "new_password": "pw3", "confirm": "pw3" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let expired = TokenService::new(&config.auth.secret_key, -120, -120)
        .issue_reset_token(&email)
        .expect("expired token");
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/auth/reset_password/{}", expired),
        Some(serde_json::json!({ "new_password": "pw3", "confirm": "pw3" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    // an auth token is not accepted as a reset token
    let auth_token = login_token(&app, &email, "pw2").await;
    let resp = send_json(
        &app,
        test::TestRequest::post(),
        &format!("/auth/reset_password/{}", auth_token),
        Some(serde_json::json!({ "new_password": "pw3", "confirm": "pw3" })),
        None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn empty_results_are_ok_with_zero_pages() {
    let Some(pool) = test_pool().await else { return };
    let app = test_app!(pool);
    let email = unique_email();

    register(&app, &email, "pw1").await;
    let token = login_token(&app, &email, "pw1").await;

    let body = send_and_read(&app, "/shoppinglists", &token).await;
    assert_eq!(body["lists"].as_array().expect("lists").len(), 0);
    assert_eq!(body["total_pages"], 0);
}
