pub mod auth;
pub mod lists;
pub mod movies;
pub mod recommendations;
pub mod tmdb;

use std::sync::Arc;

use axum::{
    Json, Router,
    http::HeaderValue,
    routing::{delete, get, post},
};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = if state.config.cors_origins.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        let origins: Vec<HeaderValue> =
            state.config.cors_origins.iter().filter_map(|o| o.parse().ok()).collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    Router::new()
        .route("/api/health/", get(health))
        // local cache reads
        .route("/api/movies/", get(movies::list_movies))
        .route("/api/movies/{movie_id}/", get(movies::movie_detail))
        .route("/api/genres/", get(movies::list_genres))
        // TMDb passthrough
        .route("/api/tmdb/popular/", get(tmdb::popular))
        .route("/api/tmdb/top-rated/", get(tmdb::top_rated))
        .route("/api/tmdb/now-playing/", get(tmdb::now_playing))
        .route("/api/tmdb/upcoming/", get(tmdb::upcoming))
        .route("/api/tmdb/search/", get(tmdb::search))
        .route("/api/tmdb/movie/{tmdb_id}/", get(tmdb::movie_detail))
        .route("/api/tmdb/genres/", get(tmdb::genres))
        // recommendations (parameter translation onto TMDb discovery)
        .route("/api/recommendations/similar/{movie_id}/", get(recommendations::similar))
        .route("/api/recommendations/based-on/{movie_id}/", get(recommendations::based_on))
        .route("/api/recommendations/trending/", get(recommendations::trending))
        .route("/api/recommendations/by-genre/", get(recommendations::by_genre))
        .route("/api/recommendations/discover/", get(recommendations::discover))
        // identity
        .route("/api/auth/register/", post(auth::register))
        .route("/api/auth/login/", post(auth::login))
        .route("/api/auth/token/refresh/", post(auth::refresh))
        .route("/api/auth/profile/", get(auth::profile).put(auth::update_profile))
        // favorites / watchlist
        .route("/api/auth/favorites/", get(lists::list_favorites).post(lists::add_favorite))
        .route("/api/auth/favorites/{id}/", delete(lists::remove_favorite))
        .route("/api/auth/favorites/check/{movie_id}/", get(lists::check_favorite))
        .route("/api/auth/watchlist/", get(lists::list_watchlist).post(lists::add_watchlist))
        .route("/api/auth/watchlist/{id}/", delete(lists::remove_watchlist))
        .route("/api/auth/watchlist/check/{movie_id}/", get(lists::check_watchlist))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "message": "popcornflix API with TMDb integration is running",
    }))
}
