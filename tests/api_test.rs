mod common;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use popcornflix::{AppState, models::TmdbMovie, routes};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let req = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, "GET", uri, None, None).await
}

async fn seed_movie(state: &AppState) -> i32 {
    let raw = common::popular_fixture()["results"][0].clone();
    let m: TmdbMovie = serde_json::from_value(raw).unwrap();
    let (id, _) = state.cache.upsert_movie(&m).await.unwrap();
    id
}

async fn register_and_login(app: &Router) -> (String, String) {
    let (status, _) = send(
        app,
        "POST",
        "/api/auth/register/",
        None,
        Some(json!({
            "email": "ada@example.com",
            "username": "ada",
            "password": "hunter2hunter2",
            "password_confirm": "hunter2hunter2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(
        app,
        "POST",
        "/api/auth/login/",
        None,
        Some(json!({"email": "ada@example.com", "password": "hunter2hunter2"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    (
        body["access"].as_str().unwrap().to_string(),
        body["refresh"].as_str().unwrap().to_string(),
    )
}

#[tokio::test]
async fn health_reports_ok() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/health/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn list_rejects_bad_pagination() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/movies/?page_size=101").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("page_size"));

    let (status, body) = get(&app, "/api/movies/?page=abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid page number");

    let (status, _) = get(&app, "/api/movies/?page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_requires_query() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/tmdb/search/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Query parameter \"q\" is required");
}

#[tokio::test]
async fn trending_rejects_unknown_window() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/recommendations/trending/?time_window=month").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn by_genre_validates_genre_ids() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/recommendations/by-genre/").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("genres"));

    let (status, body) = get(&app, "/api/recommendations/by-genre/?genres=28,action").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid genre IDs");
}

#[tokio::test]
async fn popular_passthrough_builds_image_urls() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::popular_fixture()))
        .mount(&server)
        .await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/tmdb/popular/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["page"], 1);
    assert_eq!(body["total_results"], 2);
    assert_eq!(
        body["results"][0]["poster_url"],
        "https://image.tmdb.org/t/p/w500/fight-club.jpg"
    );
    assert_eq!(body["results"][1]["poster_url"], Value::Null);
}

#[tokio::test]
async fn upstream_outage_maps_to_service_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/tmdb/popular/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert!(body["error"].as_str().unwrap().contains("TMDb"));
}

#[tokio::test]
async fn listing_404_is_an_upstream_fault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/top_rated"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let app = routes::router(common::test_state(&server).await);

    // only per-movie endpoints treat an upstream 404 as "movie not found"
    let (status, _) = get(&app, "/api/tmdb/top-rated/").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn similar_for_unknown_movie_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999/similar"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/recommendations/similar/999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Movie not found");
}

#[tokio::test]
async fn unknown_tmdb_movie_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/999"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    let app = routes::router(common::test_state(&server).await);

    let (status, body) = get(&app, "/api/tmdb/movie/999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Movie not found");
}

#[tokio::test]
async fn local_listing_filters_and_envelopes() {
    let server = MockServer::start().await;
    let state = common::test_state(&server).await;
    for raw in common::popular_fixture()["results"].as_array().unwrap() {
        let m: TmdbMovie = serde_json::from_value(raw.clone()).unwrap();
        state.cache.upsert_movie(&m).await.unwrap();
    }
    let app = routes::router(state);

    let (status, body) = get(&app, "/api/movies/").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 2);
    assert_eq!(body["total_pages"], 1);
    // ordered by popularity, The Matrix first
    assert_eq!(body["results"][0]["tmdb_id"], 603);

    let (status, body) = get(&app, "/api/movies/?search=fight").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 1);

    let (status, body) = get(&app, "/api/movies/?min_rating=8.3").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 1);
    assert_eq!(body["results"][0]["tmdb_id"], 550);

    // unknown genre yields an empty page, not an error
    let (status, body) = get(&app, "/api/movies/?genre=9999").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 0);
    assert_eq!(body["total_pages"], 1);

    let (status, _) = get(&app, "/api/movies/99999/").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn register_login_refresh_flow() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (access, refresh) = register_and_login(&app).await;

    // duplicate registration is rejected
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register/",
        None,
        Some(json!({
            "email": "ada@example.com",
            "username": "ada2",
            "password": "hunter2hunter2",
            "password_confirm": "hunter2hunter2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already exists"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/login/",
        None,
        Some(json!({"email": "ada@example.com", "password": "wrong-password"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get(&app, "/api/auth/profile/").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, "GET", "/api/auth/profile/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "ada@example.com");
    assert!(body.get("password_hash").is_none());

    // an access token is not accepted as a refresh token
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/token/refresh/",
        None,
        Some(json!({"refresh": access})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/token/refresh/",
        None,
        Some(json!({"refresh": refresh})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access"].is_string());
}

#[tokio::test]
async fn register_validates_input() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register/",
        None,
        Some(json!({
            "email": "not-an-email",
            "username": "x",
            "password": "hunter2hunter2",
            "password_confirm": "hunter2hunter2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register/",
        None,
        Some(json!({
            "email": "b@example.com",
            "username": "b",
            "password": "short",
            "password_confirm": "short"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("at least"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register/",
        None,
        Some(json!({
            "email": "c@example.com",
            "username": "c",
            "password": "hunter2hunter2",
            "password_confirm": "something-else"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("match"));
}

#[tokio::test]
async fn usernames_are_unique() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (access, _) = register_and_login(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/register/",
        None,
        Some(json!({
            "email": "other@example.com",
            "username": "ada",
            "password": "hunter2hunter2",
            "password_confirm": "hunter2hunter2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("username already exists"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/register/",
        None,
        Some(json!({
            "email": "grace@example.com",
            "username": "grace",
            "password": "hunter2hunter2",
            "password_confirm": "hunter2hunter2"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // the first user cannot rename themselves onto a taken username
    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/profile/",
        Some(&access),
        Some(json!({"username": "grace"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("username already exists"));

    // keeping your own username is not a conflict
    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/profile/",
        Some(&access),
        Some(json!({"username": "ada"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "ada");
}

#[tokio::test]
async fn favorites_lifecycle() {
    let server = MockServer::start().await;
    let state = common::test_state(&server).await;
    let movie_id = seed_movie(&state).await;
    let app = routes::router(state);

    let (access, _) = register_and_login(&app).await;

    let (status, _) = get(&app, "/api/auth/favorites/").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/favorites/",
        Some(&access),
        Some(json!({"movie_id": movie_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["movie"]["tmdb_id"], 550);
    let entry_id = body["id"].as_i64().unwrap();

    // adding twice is rejected
    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/favorites/",
        Some(&access),
        Some(json!({"movie_id": movie_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already in favorites"));

    // unknown movie is a validation error
    let (status, _) = send(
        &app,
        "POST",
        "/api/auth/favorites/",
        Some(&access),
        Some(json!({"movie_id": 424242})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/auth/favorites/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 1);

    let uri = format!("/api/auth/favorites/check/{movie_id}/");
    let (status, body) = send(&app, "GET", &uri, Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorite"], true);

    let (status, _) = send(&app, "GET", "/api/auth/favorites/check/424242/", Some(&access), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let uri = format!("/api/auth/favorites/{entry_id}/");
    let (status, _) = send(&app, "DELETE", &uri, Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "DELETE", &uri, Some(&access), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Favorite not found");

    let uri = format!("/api/auth/favorites/check/{movie_id}/");
    let (status, body) = send(&app, "GET", &uri, Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_favorite"], false);
}

#[tokio::test]
async fn watchlist_lifecycle() {
    let server = MockServer::start().await;
    let state = common::test_state(&server).await;
    let movie_id = seed_movie(&state).await;
    let app = routes::router(state);

    let (access, _) = register_and_login(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/watchlist/",
        Some(&access),
        Some(json!({"movie_id": movie_id})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let entry_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        "/api/auth/watchlist/",
        Some(&access),
        Some(json!({"movie_id": movie_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("already in watchlist"));

    let uri = format!("/api/auth/watchlist/check/{movie_id}/");
    let (status, body) = send(&app, "GET", &uri, Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_in_watchlist"], true);

    let uri = format!("/api/auth/watchlist/{entry_id}/");
    let (status, _) = send(&app, "DELETE", &uri, Some(&access), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/api/auth/watchlist/", Some(&access), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_results"], 0);
}

#[tokio::test]
async fn profile_update_changes_name() {
    let server = MockServer::start().await;
    let app = routes::router(common::test_state(&server).await);

    let (access, _) = register_and_login(&app).await;

    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/profile/",
        Some(&access),
        Some(json!({"first_name": "Ada", "last_name": "Lovelace"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], "Ada");
    assert_eq!(body["last_name"], "Lovelace");

    let (status, body) = send(
        &app,
        "PUT",
        "/api/auth/profile/",
        Some(&access),
        Some(json!({"username": "   "})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("username"));
}
