//! Local cache reads: movies and genres already synced from TMDb.

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::{
    AppState,
    cache::MovieFilter,
    error::{ApiError, ApiResult},
    models::{Envelope, GenreDto, MovieDto},
    query,
};

#[derive(Debug, Deserialize)]
pub struct LocalListQuery {
    page: Option<String>,
    page_size: Option<String>,
    search: Option<String>,
    genre: Option<String>,
    min_rating: Option<String>,
}

pub async fn list_movies(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LocalListQuery>,
) -> ApiResult<Json<Envelope<MovieDto>>> {
    let pg = query::pagination(q.page.as_deref(), q.page_size.as_deref())?;

    let genre_tmdb_id = match q.genre.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => {
            Some(raw.parse::<i32>().map_err(|_| ApiError::validation("Invalid genre id"))?)
        },
    };
    let min_rating = match q.min_rating.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        None => None,
        Some(raw) => Some(query::parse_min_rating(raw)?),
    };

    let filter = MovieFilter {
        search: q.search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        genre_tmdb_id,
        min_rating,
    };

    let (rows, total) = state.cache.list_movies(&filter, pg.page, pg.page_size).await?;

    let movie_ids: Vec<i32> = rows.iter().map(|m| m.id).collect();
    let mut genres = state.cache.genres_for_movies(&movie_ids).await?;

    let results = rows
        .into_iter()
        .map(|m| {
            let movie_genres = genres.remove(&m.id).unwrap_or_default();
            MovieDto::from_model(m, movie_genres)
        })
        .collect();

    Ok(Json(Envelope {
        results,
        page: pg.page,
        total_pages: total.div_ceil(pg.page_size).max(1),
        total_results: total,
    }))
}

pub async fn movie_detail(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<i32>,
) -> ApiResult<Json<MovieDto>> {
    let (movie, genres) = state
        .cache
        .get_movie(movie_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Movie not found"))?;
    Ok(Json(MovieDto::from_model(movie, genres)))
}

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Envelope<GenreDto>>> {
    let genres = state.cache.list_genres().await?;
    let total = genres.len() as u64;
    Ok(Json(Envelope {
        results: genres.into_iter().map(GenreDto::from).collect(),
        page: 1,
        total_pages: 1,
        total_results: total,
    }))
}
