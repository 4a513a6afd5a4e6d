/// Shopping-list service
///
/// A multi-user shopping-list API: users register, authenticate with signed
/// bearer tokens, and manage their own lists and items with search and
/// pagination.
///
/// # Modules
///
/// - `handlers`: HTTP request handlers (auth, lists, items)
/// - `middleware`: bearer-token access guard
/// - `security`: password hashing and token issue/verification
/// - `db`: repositories over PostgreSQL
/// - `models`: row structs and request payloads
/// - `services`: password-reset mail delivery
/// - `routes`: route tree wiring
/// - `error`: error types and HTTP mapping
/// - `config`: configuration management
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod security;
pub mod services;
pub mod validators;

pub use config::Config;
pub use error::{AppError, Result};
