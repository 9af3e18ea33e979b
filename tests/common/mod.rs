#![allow(dead_code)]

use std::sync::Arc;

use migration::{Migrator, MigratorTrait};
use popcornflix::{AppState, cache::MovieCache, config::Config, tmdb::TmdbClient};
use sea_orm::{Database, DatabaseConnection};
use serde_json::{Value, json};
use wiremock::MockServer;

pub async fn test_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:").await.expect("connect in-memory sqlite");
    Migrator::up(&db, None).await.expect("run migrations");
    db
}

pub fn test_config(tmdb_base_url: &str) -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        tmdb_bearer_token: "test-token".to_string(),
        tmdb_base_url: tmdb_base_url.to_string(),
        tmdb_rps: 50,
        jwt_secret: "test-secret".to_string(),
        access_ttl_minutes: 60,
        refresh_ttl_days: 7,
        cors_origins: Vec::new(),
        sync_pages: 2,
    }
}

pub fn test_tmdb(config: &Config) -> TmdbClient {
    TmdbClient::new(
        reqwest::Client::new(),
        config.tmdb_bearer_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    )
}

pub async fn test_state(mock: &MockServer) -> Arc<AppState> {
    let db = test_db().await;
    let cache = MovieCache::new(db.clone());
    let config = Arc::new(test_config(&mock.uri()));
    let tmdb = Arc::new(test_tmdb(&config));
    Arc::new(AppState { config, db, cache, tmdb })
}

pub fn genre_fixture() -> Value {
    json!({
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 12, "name": "Adventure"},
            {"id": 16, "name": "Animation"}
        ]
    })
}

pub fn popular_fixture() -> Value {
    json!({
        "page": 1,
        "total_pages": 1,
        "total_results": 2,
        "results": [
            {
                "id": 550,
                "title": "Fight Club",
                "original_title": "Fight Club",
                "overview": "An insomniac office worker crosses paths with a soap maker.",
                "release_date": "1999-10-15",
                "vote_average": 8.4,
                "vote_count": 26000,
                "popularity": 61.4,
                "poster_path": "/fight-club.jpg",
                "original_language": "en",
                "genre_ids": [28, 12]
            },
            {
                "id": 603,
                "title": "The Matrix",
                "original_title": "The Matrix",
                "overview": "A hacker learns the truth about his reality.",
                "release_date": "1999-03-31",
                "vote_average": 8.2,
                "vote_count": 24000,
                "popularity": 72.0,
                "original_language": "en",
                "genre_ids": [28]
            }
        ]
    })
}
