use std::net::SocketAddr;

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub database_url: String,
    pub tmdb_bearer_token: String,
    pub tmdb_base_url: String,
    pub tmdb_rps: u32,
    pub jwt_secret: String,
    pub access_ttl_minutes: i64,
    pub refresh_ttl_days: i64,
    pub cors_origins: Vec<String>,
    pub sync_pages: u32,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8000".to_string()).parse().context("PORT")?;

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://popcornflix.db?mode=rwc".to_string());

        let tmdb_bearer_token = std::env::var("TMDB_BEARER_TOKEN").unwrap_or_default();
        let tmdb_base_url = std::env::var("TMDB_BASE_URL")
            .unwrap_or_else(|_| "https://api.themoviedb.org/3".to_string());

        let tmdb_rps: u32 =
            std::env::var("TMDB_RPS").ok().and_then(|s| s.parse().ok()).unwrap_or(4);

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET")?;

        let access_ttl_minutes: i64 =
            std::env::var("ACCESS_TTL_MINUTES").ok().and_then(|s| s.parse().ok()).unwrap_or(60);

        let refresh_ttl_days: i64 =
            std::env::var("REFRESH_TTL_DAYS").ok().and_then(|s| s.parse().ok()).unwrap_or(7);

        let cors_origins = std::env::var("CORS_ORIGINS")
            .map(|s| {
                s.split(',').map(|o| o.trim().to_string()).filter(|o| !o.is_empty()).collect()
            })
            .unwrap_or_default();

        let sync_pages: u32 =
            std::env::var("SYNC_PAGES").ok().and_then(|s| s.parse().ok()).unwrap_or(5);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            database_url,
            tmdb_bearer_token,
            tmdb_base_url,
            tmdb_rps,
            jwt_secret,
            access_ttl_minutes,
            refresh_ttl_days,
            cors_origins,
            sync_pages,
        })
    }
}
