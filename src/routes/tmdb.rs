//! Upstream passthrough endpoints. Results are re-serialized into the
//! uniform envelope with full image URLs attached; upstream failures map to
//! a 503 response.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::{
        Envelope, GenreListResponse, SearchEnvelope, TmdbMovieDetailDto, TmdbMovieDto, TmdbPage,
    },
    query,
};

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

pub fn envelope_from_page(data: TmdbPage) -> Envelope<TmdbMovieDto> {
    Envelope {
        results: data.results.into_iter().map(TmdbMovieDto::from).collect(),
        page: data.page as u64,
        total_pages: data.total_pages as u64,
        total_results: data.total_results,
    }
}

pub async fn popular(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let page = query::parse_page(q.page.as_deref())?;
    let data = state.tmdb.popular(page).await?;
    Ok(Json(envelope_from_page(data)))
}

pub async fn top_rated(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let page = query::parse_page(q.page.as_deref())?;
    let data = state.tmdb.top_rated(page).await?;
    Ok(Json(envelope_from_page(data)))
}

pub async fn now_playing(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let page = query::parse_page(q.page.as_deref())?;
    let data = state.tmdb.now_playing(page).await?;
    Ok(Json(envelope_from_page(data)))
}

pub async fn upcoming(
    State(state): State<Arc<AppState>>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let page = query::parse_page(q.page.as_deref())?;
    let data = state.tmdb.upcoming(page).await?;
    Ok(Json(envelope_from_page(data)))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: Option<String>,
    page: Option<String>,
}

pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Json<SearchEnvelope>> {
    let text = params
        .q
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::validation(r#"Query parameter "q" is required"#))?
        .to_string();

    let page = query::parse_page(params.page.as_deref())?;
    let data = state.tmdb.search(&text, page).await?;
    Ok(Json(SearchEnvelope { envelope: envelope_from_page(data), query: text }))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(tmdb_id): Path<i32>,
) -> ApiResult<Json<TmdbMovieDetailDto>> {
    let detail = state.tmdb.movie_details(tmdb_id).await?;
    Ok(Json(detail.into()))
}

pub async fn genres(State(state): State<Arc<AppState>>) -> ApiResult<Json<GenreListResponse>> {
    let data = state.tmdb.genres().await?;
    Ok(Json(data))
}
