//! Per-user favorites and watchlist CRUD. Everything here is scoped to the
//! authenticated caller; the two lists are deliberately symmetric.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use sea_orm::EntityTrait;
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::CurrentUser,
    entities::movie,
    error::{ApiError, ApiResult},
    models::{Envelope, ListEntryDto, MovieDto, MovieRefRequest},
    users,
};

async fn entry_dto(
    state: &AppState,
    id: i32,
    created_at: i64,
    movie: movie::Model,
) -> ApiResult<ListEntryDto> {
    let genres = state.cache.genres_for_movie(movie.id).await?;
    Ok(ListEntryDto { id, created_at, movie: MovieDto::from_model(movie, genres) })
}

fn enveloped(results: Vec<ListEntryDto>) -> Envelope<ListEntryDto> {
    let total = results.len() as u64;
    Envelope { results, page: 1, total_pages: 1, total_results: total }
}

async fn require_local_movie(state: &AppState, movie_id: i32) -> ApiResult<()> {
    movie::Entity::find_by_id(movie_id)
        .one(&state.db)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

pub async fn list_favorites(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<ListEntryDto>>> {
    let rows = users::list_favorites(&state.db, user.id).await?;
    let mut results = Vec::with_capacity(rows.len());
    for (entry, movie) in rows {
        results.push(entry_dto(&state, entry.id, entry.created_at, movie).await?);
    }
    Ok(Json(enveloped(results)))
}

pub async fn add_favorite(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<MovieRefRequest>,
) -> ApiResult<(StatusCode, Json<ListEntryDto>)> {
    let (entry, movie) = users::add_favorite(&state.db, user.id, req.movie_id).await?;
    let dto = entry_dto(&state, entry.id, entry.created_at, movie).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

pub async fn remove_favorite(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    users::remove_favorite(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_favorite(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(movie_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    require_local_movie(&state, movie_id).await?;
    let is_favorite = users::is_favorite(&state.db, user.id, movie_id).await?;
    Ok(Json(json!({ "is_favorite": is_favorite })))
}

// ---------------------------------------------------------------------------
// Watchlist
// ---------------------------------------------------------------------------

pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
) -> ApiResult<Json<Envelope<ListEntryDto>>> {
    let rows = users::list_watchlist(&state.db, user.id).await?;
    let mut results = Vec::with_capacity(rows.len());
    for (entry, movie) in rows {
        results.push(entry_dto(&state, entry.id, entry.created_at, movie).await?);
    }
    Ok(Json(enveloped(results)))
}

pub async fn add_watchlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<MovieRefRequest>,
) -> ApiResult<(StatusCode, Json<ListEntryDto>)> {
    let (entry, movie) = users::add_watchlist(&state.db, user.id, req.movie_id).await?;
    let dto = entry_dto(&state, entry.id, entry.created_at, movie).await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

pub async fn remove_watchlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<i32>,
) -> ApiResult<StatusCode> {
    users::remove_watchlist(&state.db, user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn check_watchlist(
    State(state): State<Arc<AppState>>,
    CurrentUser(user): CurrentUser,
    Path(movie_id): Path<i32>,
) -> ApiResult<Json<Value>> {
    require_local_movie(&state, movie_id).await?;
    let is_in_watchlist = users::is_in_watchlist(&state.db, user.id, movie_id).await?;
    Ok(Json(json!({ "is_in_watchlist": is_in_watchlist })))
}
