//! Recommendation endpoints: query-parameter translations onto TMDb's
//! similar/recommendations/trending/discover listings.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState,
    error::{ApiError, ApiResult},
    models::{Envelope, TmdbMovieDto},
    query::{self, DiscoverParams, SortKey, TimeWindow},
    routes::tmdb::{PageQuery, envelope_from_page},
};

pub async fn similar(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let page = query::parse_page(q.page.as_deref())?;
    let data = state.tmdb.similar(movie_id, page).await?;
    Ok(Json(envelope_from_page(data)))
}

pub async fn based_on(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
    Query(q): Query<PageQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let page = query::parse_page(q.page.as_deref())?;
    let data = state.tmdb.recommendations(movie_id, page).await?;
    Ok(Json(envelope_from_page(data)))
}

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    time_window: Option<String>,
    page: Option<String>,
}

pub async fn trending(
    State(state): State<Arc<AppState>>,
    Query(q): Query<TrendingQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let window = TimeWindow::parse(q.time_window.as_deref())?;
    let page = query::parse_page(q.page.as_deref())?;
    let data = state.tmdb.trending(window, page).await?;
    Ok(Json(envelope_from_page(data)))
}

#[derive(Debug, Deserialize)]
pub struct ByGenreQuery {
    genres: Option<String>,
    sort_by: Option<String>,
    page: Option<String>,
}

pub async fn by_genre(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ByGenreQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let raw = q
        .genres
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| {
            ApiError::validation("genres parameter is required (comma-separated genre IDs)")
        })?;

    let params = DiscoverParams {
        with_genres: Some(query::parse_genre_list(raw)?),
        primary_release_year: None,
        vote_average_gte: None,
        vote_count_gte: query::DEFAULT_MIN_VOTE_COUNT,
        sort_by: SortKey::parse(q.sort_by.as_deref())?,
        page: query::parse_page(q.page.as_deref())?,
    };

    let data = state.tmdb.discover(&params).await?;
    Ok(Json(envelope_from_page(data)))
}

#[derive(Debug, Deserialize)]
pub struct DiscoverQuery {
    with_genres: Option<String>,
    primary_release_year: Option<String>,
    vote_average_gte: Option<String>,
    vote_count_gte: Option<String>,
    sort_by: Option<String>,
    page: Option<String>,
}

pub async fn discover(
    State(state): State<Arc<AppState>>,
    Query(q): Query<DiscoverQuery>,
) -> ApiResult<Json<Envelope<TmdbMovieDto>>> {
    let with_genres = match q.with_genres.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(query::parse_genre_list(raw)?),
    };

    let primary_release_year =
        match q.primary_release_year.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(
                raw.parse::<i32>().map_err(|_| ApiError::validation("Invalid release year"))?,
            ),
        };

    let vote_average_gte =
        match q.vote_average_gte.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            None => None,
            Some(raw) => Some(query::parse_min_rating(raw)?),
        };

    let vote_count_gte = match q.vote_count_gte.as_deref().map(str::trim).filter(|s| !s.is_empty())
    {
        None => query::DEFAULT_MIN_VOTE_COUNT,
        Some(raw) => raw
            .parse::<i32>()
            .ok()
            .filter(|n| *n >= 0)
            .ok_or_else(|| ApiError::validation("Invalid minimum vote count"))?,
    };

    let params = DiscoverParams {
        with_genres,
        primary_release_year,
        vote_average_gte,
        vote_count_gte,
        sort_by: SortKey::parse(q.sort_by.as_deref())?,
        page: query::parse_page(q.page.as_deref())?,
    };

    let data = state.tmdb.discover(&params).await?;
    Ok(Json(envelope_from_page(data)))
}
