use std::sync::Arc;

use axum::{extract::FromRequestParts, http::header, http::request::Parts};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::{
    AppState,
    cache::now_sec,
    entities::user,
    error::{ApiError, ApiResult},
    users,
};

pub const TOKEN_ACCESS: &str = "access";
pub const TOKEN_REFRESH: &str = "refresh";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub token_type: String,
}

pub fn hash_password(password: &str) -> ApiResult<String> {
    let hash = bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

pub fn issue_token(
    secret: &str,
    user_id: i32,
    token_type: &str,
    ttl_seconds: i64,
) -> ApiResult<String> {
    let exp = now_sec().saturating_add(ttl_seconds);
    let claims = Claims {
        sub: user_id.to_string(),
        exp: exp as usize,
        token_type: token_type.to_string(),
    };
    let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| ApiError::Internal(anyhow::Error::new(e)))?;
    Ok(token)
}

/// Decodes a token, checks its type tag, and returns the user id.
pub fn decode_token(secret: &str, token: &str, expected_type: &str) -> ApiResult<i32> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Auth("Invalid or expired token.".to_string()))?;

    if data.claims.token_type != expected_type {
        return Err(ApiError::Auth(format!("Token is not of type \"{expected_type}\".")));
    }

    data.claims
        .sub
        .parse()
        .map_err(|_| ApiError::Auth("Invalid or expired token.".to_string()))
}

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header. Rejects missing or malformed credentials with a 401.
pub struct CurrentUser(pub user::Model);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                ApiError::Auth("Authentication credentials were not provided.".to_string())
            })?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Auth("Invalid authorization header.".to_string()))?;

        let user_id = decode_token(&state.config.jwt_secret, token, TOKEN_ACCESS)?;

        let user = users::find_by_id(&state.db, user_id)
            .await?
            .ok_or_else(|| ApiError::Auth("User not found.".to_string()))?;
        if !user.is_active {
            return Err(ApiError::Auth("User account is disabled.".to_string()));
        }

        Ok(CurrentUser(user))
    }
}
