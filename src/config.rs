/// Configuration management
///
/// All settings come from environment variables (a local `.env` file is
/// honored in development). Nothing security-sensitive has a production
/// default.
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub app: AppConfig,
    pub cors: CorsConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub email: EmailConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application environment (development, staging, production)
    pub env: String,
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    /// Comma-separated list of allowed origins
    pub allowed_origins: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for signing bearer and reset tokens
    pub secret_key: String,
    /// Auth token lifetime in seconds
    pub auth_token_ttl_secs: i64,
    /// Password-reset token lifetime in seconds
    pub reset_token_ttl_secs: i64,
    /// Argon2 work factor
    pub hash_memory_kib: u32,
    pub hash_iterations: u32,
    pub hash_parallelism: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    /// SMTP relay host; empty disables sending (no-op mode)
    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from: String,
    /// Base URL the reset link is built from
    pub password_reset_base_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationConfig {
    /// Default page size for list/item search results
    pub page_size: i64,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, String> {
        let app_env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string());

        Ok(Config {
            app: AppConfig {
                env: app_env.clone(),
                host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: std::env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(8080),
            },
            cors: {
                let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
                    Ok(value) => value,
                    Err(_) if app_env.eq_ignore_ascii_case("production") => {
                        return Err("CORS_ALLOWED_ORIGINS must be set in production".to_string())
                    }
                    Err(_) => "http://localhost:3000".to_string(),
                };

                if app_env.eq_ignore_ascii_case("production") && allowed_origins.trim() == "*" {
                    return Err("CORS_ALLOWED_ORIGINS cannot be '*' in production".to_string());
                }

                CorsConfig { allowed_origins }
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .map_err(|_| "DATABASE_URL must be set".to_string())?,
                max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|c| c.parse().ok())
                    .unwrap_or(10),
            },
            auth: {
                let secret_key = match std::env::var("SECRET_KEY") {
                    Ok(value) if !value.trim().is_empty() => value,
                    _ if app_env.eq_ignore_ascii_case("production") => {
                        return Err("SECRET_KEY must be set in production".to_string())
                    }
                    _ => "dev-secret-do-not-use-in-production".to_string(),
                };

                AuthConfig {
                    secret_key,
                    auth_token_ttl_secs: std::env::var("AUTH_TOKEN_TTL_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(10_800),
                    reset_token_ttl_secs: std::env::var("RESET_TOKEN_TTL_SECS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(3_600),
                    hash_memory_kib: std::env::var("HASH_MEMORY_KIB")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(19_456),
                    hash_iterations: std::env::var("HASH_ITERATIONS")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(2),
                    hash_parallelism: std::env::var("HASH_PARALLELISM")
                        .ok()
                        .and_then(|v| v.parse().ok())
                        .unwrap_or(1),
                }
            },
            email: EmailConfig {
                smtp_host: std::env::var("SMTP_HOST").unwrap_or_default(),
                smtp_port: std::env::var("SMTP_PORT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(587),
                smtp_username: std::env::var("SMTP_USERNAME").ok(),
                smtp_password: std::env::var("SMTP_PASSWORD").ok(),
                smtp_from: std::env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "no-reply@localhost".to_string()),
                password_reset_base_url: std::env::var("PASSWORD_RESET_BASE_URL")
                    .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            },
            pagination: PaginationConfig {
                page_size: std::env::var("PAGE_SIZE")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(7),
            },
        })
    }
}
