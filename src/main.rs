use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use shoppinglist_service::security::{PasswordService, TokenService};
use shoppinglist_service::services::EmailService;
use shoppinglist_service::{routes, Config};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    tracing::info!(
        "Starting shoppinglist-service v{}",
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&pool)
        .await
        .context("Failed to verify database connection")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!("Database migrations completed");

    // Application context, constructed once and injected into handlers
    let pool_data = web::Data::new(pool);
    let config_data = web::Data::new(config.clone());
    let tokens = web::Data::new(TokenService::new(
        &config.auth.secret_key,
        config.auth.auth_token_ttl_secs,
        config.auth.reset_token_ttl_secs,
    ));
    let hasher = web::Data::new(
        PasswordService::new(&config.auth)
            .map_err(|e| anyhow::anyhow!("Failed to build password hasher: {}", e))?,
    );
    let mailer = web::Data::new(
        EmailService::new(&config.email)
            .map_err(|e| anyhow::anyhow!("Failed to build email service: {}", e))?,
    );

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in config.cors.allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        let cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(tokens.clone())
            .app_data(hasher.clone())
            .app_data(mailer.clone())
            .wrap(cors)
            .wrap(tracing_actix_web::TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_address)?
    .run()
    .await
    .context("HTTP server error")
}
