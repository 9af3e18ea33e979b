use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    models::{GenreListResponse, TmdbMovieDetail, TmdbPage},
    query::{DiscoverParams, TimeWindow},
};

#[derive(Debug, Error)]
pub enum TmdbError {
    #[error("Unable to fetch data from TMDb API: {0}")]
    Unavailable(String),
    #[error("movie not found on TMDb")]
    NotFound,
    #[error("malformed TMDb response: {0}")]
    Parse(String),
}

/// Thin authenticated client over TMDb's REST API. One request per call, no
/// retries; a direct rate limiter spaces calls out.
pub struct TmdbClient {
    client: reqwest::Client,
    bearer_token: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, bearer_token: String, base_url: String, rps: u32) -> Self {
        if bearer_token.trim().is_empty() {
            tracing::warn!("no TMDB_BEARER_TOKEN provided - upstream calls will be rejected");
        }

        let limiter =
            Arc::new(RateLimiter::direct(Quota::per_second(NonZeroU32::new(rps.max(1)).unwrap())));
        Self { client, bearer_token, base_url, limiter }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
        missing_is_not_found: bool,
    ) -> Result<T, TmdbError> {
        self.limiter.until_ready().await;

        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        let resp = self
            .client
            .get(&url)
            .bearer_auth(&self.bearer_token)
            .query(params)
            .send()
            .await
            .map_err(|e| TmdbError::Unavailable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND && missing_is_not_found {
            return Err(TmdbError::NotFound);
        }
        if !status.is_success() {
            return Err(TmdbError::Unavailable(format!("TMDb returned {status}")));
        }

        resp.json::<T>().await.map_err(|e| TmdbError::Parse(e.to_string()))
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, TmdbError> {
        self.fetch(path, params, false).await
    }

    /// For endpoints addressing a single movie, where a 404 means the id does
    /// not exist upstream. A 404 from a listing is an upstream fault.
    async fn get_by_id<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(String, String)],
    ) -> Result<T, TmdbError> {
        self.fetch(path, params, true).await
    }

    fn page_param(page: u32) -> Vec<(String, String)> {
        vec![("page".to_string(), page.to_string())]
    }

    pub async fn popular(&self, page: u32) -> Result<TmdbPage, TmdbError> {
        self.get("movie/popular", &Self::page_param(page)).await
    }

    pub async fn top_rated(&self, page: u32) -> Result<TmdbPage, TmdbError> {
        self.get("movie/top_rated", &Self::page_param(page)).await
    }

    pub async fn now_playing(&self, page: u32) -> Result<TmdbPage, TmdbError> {
        self.get("movie/now_playing", &Self::page_param(page)).await
    }

    pub async fn upcoming(&self, page: u32) -> Result<TmdbPage, TmdbError> {
        self.get("movie/upcoming", &Self::page_param(page)).await
    }

    pub async fn search(&self, query: &str, page: u32) -> Result<TmdbPage, TmdbError> {
        let params = vec![
            ("query".to_string(), query.to_string()),
            ("page".to_string(), page.to_string()),
        ];
        self.get("search/movie", &params).await
    }

    pub async fn movie_details(&self, tmdb_id: i32) -> Result<TmdbMovieDetail, TmdbError> {
        self.get_by_id(&format!("movie/{tmdb_id}"), &[]).await
    }

    pub async fn genres(&self) -> Result<GenreListResponse, TmdbError> {
        self.get("genre/movie/list", &[]).await
    }

    pub async fn similar(&self, tmdb_id: i32, page: u32) -> Result<TmdbPage, TmdbError> {
        self.get_by_id(&format!("movie/{tmdb_id}/similar"), &Self::page_param(page)).await
    }

    pub async fn recommendations(&self, tmdb_id: i32, page: u32) -> Result<TmdbPage, TmdbError> {
        self.get_by_id(&format!("movie/{tmdb_id}/recommendations"), &Self::page_param(page)).await
    }

    pub async fn trending(&self, window: TimeWindow, page: u32) -> Result<TmdbPage, TmdbError> {
        self.get(&format!("trending/movie/{}", window.as_str()), &Self::page_param(page)).await
    }

    pub async fn discover(&self, params: &DiscoverParams) -> Result<TmdbPage, TmdbError> {
        self.get("discover/movie", &params.to_query()).await
    }
}
