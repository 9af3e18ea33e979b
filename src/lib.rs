pub mod auth;
pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod query;
pub mod routes;
pub mod sync;
pub mod tmdb;
pub mod users;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::{cache::MovieCache, config::Config, tmdb::TmdbClient};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: DatabaseConnection,
    pub cache: MovieCache,
    pub tmdb: Arc<TmdbClient>,
}
