use serde::{Deserialize, Serialize};

use crate::entities::{genre, movie, user};

pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";
pub const BACKDROP_BASE_URL: &str = "https://image.tmdb.org/t/p/w1280";

pub fn poster_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty()).map(|p| format!("{POSTER_BASE_URL}{p}"))
}

pub fn backdrop_url(path: Option<&str>) -> Option<String> {
    path.filter(|p| !p.is_empty()).map(|p| format!("{BACKDROP_BASE_URL}{p}"))
}

/// Uniform paginated response wrapper for every list endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub results: Vec<T>,
    pub page: u64,
    pub total_pages: u64,
    pub total_results: u64,
}

#[derive(Debug, Serialize)]
pub struct SearchEnvelope {
    #[serde(flatten)]
    pub envelope: Envelope<TmdbMovieDto>,
    pub query: String,
}

// ---------------------------------------------------------------------------
// TMDb wire types
// ---------------------------------------------------------------------------

fn default_page() -> u32 {
    1
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbPage {
    #[serde(default)]
    pub results: Vec<TmdbMovie>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovie {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub vote_count: i32,
    #[serde(default)]
    pub popularity: Option<f64>,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub adult: bool,
    #[serde(default)]
    pub video: bool,
    #[serde(default)]
    pub original_language: String,
    #[serde(default)]
    pub genre_ids: Vec<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbGenre {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenreListResponse {
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbMovieDetail {
    #[serde(flatten)]
    pub movie: TmdbMovie,
    #[serde(default)]
    pub runtime: Option<i32>,
    #[serde(default)]
    pub budget: Option<i64>,
    #[serde(default)]
    pub revenue: Option<i64>,
    #[serde(default)]
    pub tagline: String,
    #[serde(default)]
    pub homepage: String,
    #[serde(default)]
    pub imdb_id: Option<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub production_companies: Vec<serde_json::Value>,
    #[serde(default)]
    pub production_countries: Vec<serde_json::Value>,
    #[serde(default)]
    pub spoken_languages: Vec<serde_json::Value>,
}

// ---------------------------------------------------------------------------
// Outbound DTOs
// ---------------------------------------------------------------------------

/// Passthrough movie entry as rendered to API clients, with the full image
/// URLs computed from the raw paths.
#[derive(Debug, Serialize)]
pub struct TmdbMovieDto {
    pub id: i32,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub vote_count: i32,
    pub popularity: Option<f64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub adult: bool,
    pub video: bool,
    pub original_language: String,
    pub genre_ids: Vec<i32>,
}

impl From<TmdbMovie> for TmdbMovieDto {
    fn from(m: TmdbMovie) -> Self {
        Self {
            id: m.id,
            poster_url: poster_url(m.poster_path.as_deref()),
            backdrop_url: backdrop_url(m.backdrop_path.as_deref()),
            title: m.title,
            original_title: m.original_title,
            overview: m.overview,
            release_date: m.release_date.filter(|d| !d.is_empty()),
            vote_average: m.vote_average,
            vote_count: m.vote_count,
            popularity: m.popularity,
            poster_path: m.poster_path,
            backdrop_path: m.backdrop_path,
            adult: m.adult,
            video: m.video,
            original_language: m.original_language,
            genre_ids: m.genre_ids,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TmdbMovieDetailDto {
    #[serde(flatten)]
    pub movie: TmdbMovieDto,
    pub runtime: Option<i32>,
    pub budget: Option<i64>,
    pub revenue: Option<i64>,
    pub tagline: String,
    pub homepage: String,
    pub imdb_id: Option<String>,
    pub status: String,
    pub genres: Vec<TmdbGenre>,
    pub production_companies: Vec<serde_json::Value>,
    pub production_countries: Vec<serde_json::Value>,
    pub spoken_languages: Vec<serde_json::Value>,
}

impl From<TmdbMovieDetail> for TmdbMovieDetailDto {
    fn from(d: TmdbMovieDetail) -> Self {
        Self {
            movie: d.movie.into(),
            runtime: d.runtime,
            budget: d.budget,
            revenue: d.revenue,
            tagline: d.tagline,
            homepage: d.homepage,
            imdb_id: d.imdb_id,
            status: d.status,
            genres: d.genres,
            production_companies: d.production_companies,
            production_countries: d.production_countries,
            spoken_languages: d.spoken_languages,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GenreDto {
    pub id: i32,
    pub tmdb_id: i32,
    pub name: String,
}

impl From<genre::Model> for GenreDto {
    fn from(g: genre::Model) -> Self {
        Self { id: g.id, tmdb_id: g.tmdb_id, name: g.name }
    }
}

/// Locally cached movie as rendered to API clients.
#[derive(Debug, Serialize)]
pub struct MovieDto {
    pub id: i32,
    pub tmdb_id: i32,
    pub title: String,
    pub original_title: String,
    pub overview: String,
    pub release_date: Option<String>,
    pub runtime: Option<i32>,
    pub vote_average: Option<f64>,
    pub vote_count: i32,
    pub popularity: Option<f64>,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub poster_url: Option<String>,
    pub backdrop_url: Option<String>,
    pub adult: bool,
    pub video: bool,
    pub original_language: String,
    pub genres: Vec<GenreDto>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl MovieDto {
    pub fn from_model(m: movie::Model, genres: Vec<genre::Model>) -> Self {
        Self {
            id: m.id,
            tmdb_id: m.tmdb_id,
            poster_url: poster_url(m.poster_path.as_deref()),
            backdrop_url: backdrop_url(m.backdrop_path.as_deref()),
            title: m.title,
            original_title: m.original_title,
            overview: m.overview,
            release_date: m.release_date,
            runtime: m.runtime,
            vote_average: m.vote_average,
            vote_count: m.vote_count,
            popularity: m.popularity,
            poster_path: m.poster_path,
            backdrop_path: m.backdrop_path,
            adult: m.adult,
            video: m.video,
            original_language: m.original_language,
            genres: genres.into_iter().map(GenreDto::from).collect(),
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct UserDto {
    pub id: i32,
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub date_joined: i64,
    pub is_active: bool,
}

impl From<user::Model> for UserDto {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            email: u.email,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            date_joined: u.date_joined,
            is_active: u.is_active,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access: String,
    pub refresh: String,
    pub user: UserDto,
}

#[derive(Debug, Serialize)]
pub struct AccessResponse {
    pub access: String,
}

#[derive(Debug, Deserialize)]
pub struct ProfileUpdateRequest {
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Body of a favorites/watchlist add request; `movie_id` is the local
/// surrogate id, not the TMDb id.
#[derive(Debug, Deserialize)]
pub struct MovieRefRequest {
    pub movie_id: i32,
}

/// One row of a user's favorites or watchlist.
#[derive(Debug, Serialize)]
pub struct ListEntryDto {
    pub id: i32,
    pub movie: MovieDto,
    pub created_at: i64,
}
