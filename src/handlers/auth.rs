/// Authentication handlers: register, login, logout, password reset
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::db;
use crate::error::{AppError, Result};
use crate::middleware::AuthedUser;
use crate::models::{ForgotPasswordRequest, LoginRequest, RegisterRequest, ResetPasswordRequest};
use crate::security::{PasswordService, TokenService};
use crate::services::EmailService;

/// Create a user account
/// POST /auth/register
pub async fn register(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordService>,
    req: web::Json<RegisterRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let password_hash = hasher.hash_password(&req.password)?;
    let user = db::users::create_user(&pool, &req.email, &password_hash).await?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "User account successfully created."
    })))
}

/// Authenticate and issue a bearer token
/// POST /auth/login
pub async fn login(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordService>,
    tokens: web::Data<TokenService>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = db::users::find_by_email(&pool, &req.email)
        .await?
        .ok_or(AppError::NotFound("User does not exist".to_string()))?;

    if !hasher.verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Unauthorized("Incorrect Password".to_string()));
    }

    let token = tokens.issue_auth_token(user.id)?;
    db::users::set_session_token(&pool, user.id, &token).await?;

    tracing::info!(user_id = %user.id, "login successful");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Login Successful",
        "token": token,
    })))
}

/// Invalidate the current session token
/// POST /auth/logout
pub async fn logout(pool: web::Data<PgPool>, user: AuthedUser) -> Result<HttpResponse> {
    db::users::clear_session_token(&pool, user.0).await?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "You have successfully logged out!"
    })))
}

/// Email a password reset link
/// POST /auth/forgot-password
pub async fn forgot_password(
    pool: web::Data<PgPool>,
    tokens: web::Data<TokenService>,
    mailer: web::Data<EmailService>,
    req: web::Json<ForgotPasswordRequest>,
) -> Result<HttpResponse> {
    req.validate()?;

    let user = db::users::find_by_email(&pool, &req.email)
        .await?
        .ok_or(AppError::NotFound("User does not exist".to_string()))?;

    let token = tokens.issue_reset_token(&user.email)?;

    // Fire-and-forget: a transport failure must not fail this request.
    let mailer = mailer.into_inner();
    let recipient = user.email.clone();
    tokio::spawn(async move {
        if let Err(err) = mailer.send_password_reset_email(&recipient, &token).await {
            tracing::error!(error = %err, "failed to send password reset email");
        }
    });

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Password reset email sent."
    })))
}

/// Set a new password using a reset token from the emailed link
/// POST /auth/reset_password/{token}
pub async fn reset_password(
    pool: web::Data<PgPool>,
    hasher: web::Data<PasswordService>,
    tokens: web::Data<TokenService>,
    path: web::Path<String>,
    req: web::Json<ResetPasswordRequest>,
) -> Result<HttpResponse> {
    let email = tokens.verify_reset_token(&path)?;

    req.validate()?;

    let user = db::users::find_by_email(&pool, &email)
        .await?
        .ok_or(AppError::NotFound("User does not exist".to_string()))?;

    let password_hash = hasher.hash_password(&req.new_password)?;
    db::users::update_password(&pool, user.id, &password_hash).await?;

    tracing::info!(user_id = %user.id, "password reset");

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Successfully reset password!"
    })))
}
