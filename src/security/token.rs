/// Signed bearer tokens for authentication and password reset
///
/// Tokens are stateless HS256 JWTs signed with the server secret: the
/// payload carries the subject, issue/expiry timestamps, and a kind
/// discriminator so a reset token can never authorize an API request.
/// Expired and tampered tokens are reported as distinct errors.
use crate::error::{AppError, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const KIND_AUTH: &str = "auth";
const KIND_RESET: &str = "reset";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: user id (auth) or email address (reset)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token kind: "auth" or "reset"
    pub kind: String,
}

pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    auth_ttl: Duration,
    reset_ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, auth_token_ttl_secs: i64, reset_token_ttl_secs: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            auth_ttl: Duration::seconds(auth_token_ttl_secs),
            reset_ttl: Duration::seconds(reset_token_ttl_secs),
        }
    }

    /// Issue a bearer token binding the user identity
    pub fn issue_auth_token(&self, user_id: Uuid) -> Result<String> {
        self.issue(&user_id.to_string(), KIND_AUTH, self.auth_ttl)
    }

    /// Issue a short-lived token carrying the reset target email
    pub fn issue_reset_token(&self, email: &str) -> Result<String> {
        self.issue(email, KIND_RESET, self.reset_ttl)
    }

    /// Validate an auth token and return the user id it binds
    pub fn verify_auth_token(&self, token: &str) -> Result<Uuid> {
        let claims = self.verify(token, KIND_AUTH)?;
        Uuid::parse_str(&claims.sub).map_err(|_| AppError::InvalidToken)
    }

    /// Validate a reset token and return the email it targets
    pub fn verify_reset_token(&self, token: &str) -> Result<String> {
        let claims = self.verify(token, KIND_RESET)?;
        Ok(claims.sub)
    }

    fn issue(&self, sub: &str, kind: &str, ttl: Duration) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            kind: kind.to_string(),
        };

        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding_key,
        )?)
    }

    fn verify(&self, token: &str, expected_kind: &str) -> Result<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation)?;

        if data.claims.kind != expected_kind {
            return Err(AppError::InvalidToken);
        }

        Ok(data.claims)
    }
}
