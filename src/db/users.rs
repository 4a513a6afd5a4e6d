/// Credential store operations
use crate::error::{is_unique_violation, AppError, Result};
use crate::models::User;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new user from an email and an already-hashed password
pub async fn create_user(pool: &PgPool, email: &str, password_hash: &str) -> Result<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (email, password_hash)
        VALUES ($1, $2)
        RETURNING *
        "#,
    )
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e, "users_email_key") {
            AppError::Conflict("User email already exists, please choose another".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    Ok(user)
}

/// Find user by email
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Find user by ID
pub async fn find_by_id(pool: &PgPool, user_id: Uuid) -> Result<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

/// Currently stored session token for a user, if any
///
/// Used by the auth middleware as the revocation check: a presented bearer
/// token must equal this value to authorize a request.
pub async fn session_token(pool: &PgPool, user_id: Uuid) -> Result<Option<String>> {
    let token = sqlx::query_scalar::<_, Option<String>>(
        "SELECT token FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(token.flatten())
}

/// Store the token issued at login; replaces any previous session
pub async fn set_session_token(pool: &PgPool, user_id: Uuid, token: &str) -> Result<()> {
    sqlx::query(
        "UPDATE users SET token = $2, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
    )
    .bind(user_id)
    .bind(token)
    .execute(pool)
    .await?;

    Ok(())
}

/// Clear the stored session token on logout
pub async fn clear_session_token(pool: &PgPool, user_id: Uuid) -> Result<()> {
    sqlx::query(
        "UPDATE users SET token = NULL, updated_at = CURRENT_TIMESTAMP WHERE id = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Replace the password hash and invalidate the current session
pub async fn update_password(pool: &PgPool, user_id: Uuid, password_hash: &str) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE users
        SET password_hash = $2,
            token = NULL,
            updated_at = CURRENT_TIMESTAMP
        WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(password_hash)
    .execute(pool)
    .await?;

    Ok(())
}
