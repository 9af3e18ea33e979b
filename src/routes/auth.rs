//! Registration, JWT login/refresh, and profile management.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    auth::{self, CurrentUser, TOKEN_ACCESS, TOKEN_REFRESH},
    error::{ApiError, ApiResult},
    models::{
        AccessResponse, LoginRequest, LoginResponse, ProfileUpdateRequest, RefreshRequest,
        RegisterRequest, UserDto,
    },
    users::{self, NewUser},
};

const MIN_PASSWORD_LEN: usize = 8;

pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(ApiError::validation("A valid email address is required."));
    }

    let username = req.username.trim().to_string();
    if username.is_empty() {
        return Err(ApiError::validation("username is required."));
    }

    if req.password != req.password_confirm {
        return Err(ApiError::validation("Passwords do not match."));
    }
    if req.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters."
        )));
    }

    let password_hash = auth::hash_password(&req.password)?;
    let user = users::create_user(
        &state.db,
        NewUser {
            email,
            username,
            first_name: req.first_name.trim().to_string(),
            last_name: req.last_name.trim().to_string(),
            password_hash,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    let email = req.email.trim().to_lowercase();
    let user = users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| ApiError::Auth("Invalid email or password.".to_string()))?;

    if !auth::verify_password(&req.password, &user.password_hash) {
        return Err(ApiError::Auth("Invalid email or password.".to_string()));
    }
    if !user.is_active {
        return Err(ApiError::Auth("User account is disabled.".to_string()));
    }

    let secret = &state.config.jwt_secret;
    let access =
        auth::issue_token(secret, user.id, TOKEN_ACCESS, state.config.access_ttl_minutes * 60)?;
    let refresh = auth::issue_token(
        secret,
        user.id,
        TOKEN_REFRESH,
        state.config.refresh_ttl_days * 86_400,
    )?;

    Ok(Json(LoginResponse { access, refresh, user: user.into() }))
}

pub async fn refresh(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RefreshRequest>,
) -> ApiResult<Json<AccessResponse>> {
    let user_id = auth::decode_token(&state.config.jwt_secret, &req.refresh, TOKEN_REFRESH)?;

    let user = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(|| ApiError::Auth("User not found.".to_string()))?;
    if !user.is_active {
        return Err(ApiError::Auth("User account is disabled.".to_string()));
    }

    let access = auth::issue_token(
        &state.config.jwt_secret,
        user.id,
        TOKEN_ACCESS,
        state.config.access_ttl_minutes * 60,
    )?;
    Ok(Json(AccessResponse { access }))
}

pub async fn profile(CurrentUser(user): CurrentUser) -> Json<UserDto> {
    Json(user.into())
}

pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ProfileUpdateRequest>,
) -> ApiResult<Json<UserDto>> {
    let updated = users::update_profile(&state.db, user, req).await?;
    Ok(Json(updated.into()))
}
