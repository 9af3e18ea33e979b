mod common;

use popcornflix::{
    entities::{genre, movie, movie_genre},
    sync,
};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

async fn mount_genres(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/genre/movie/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::genre_fixture()))
        .mount(server)
        .await;
}

async fn mount_popular(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::popular_fixture()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn genre_sync_is_idempotent() {
    let server = MockServer::start().await;
    mount_genres(&server).await;
    let state = common::test_state(&server).await;

    let first = sync::sync_genres(&state.tmdb, &state.cache).await.unwrap();
    assert_eq!(first.created, 3);
    assert_eq!(first.updated, 0);

    let second = sync::sync_genres(&state.tmdb, &state.cache).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 3);

    let count = genre::Entity::find().count(&state.db).await.unwrap();
    assert_eq!(count, 3);
}

#[tokio::test]
async fn popular_sync_is_idempotent() {
    let server = MockServer::start().await;
    mount_genres(&server).await;
    mount_popular(&server).await;
    let state = common::test_state(&server).await;

    sync::sync_genres(&state.tmdb, &state.cache).await.unwrap();

    let first = sync::sync_popular(&state.tmdb, &state.cache, 1).await.unwrap();
    assert_eq!(first.created, 2);
    assert_eq!(first.updated, 0);
    assert_eq!(first.pages_failed, 0);

    let second = sync::sync_popular(&state.tmdb, &state.cache, 1).await.unwrap();
    assert_eq!(second.created, 0);
    assert_eq!(second.updated, 2);

    let count = movie::Entity::find().count(&state.db).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn popular_sync_links_genres() {
    let server = MockServer::start().await;
    mount_genres(&server).await;
    mount_popular(&server).await;
    let state = common::test_state(&server).await;

    sync::sync_genres(&state.tmdb, &state.cache).await.unwrap();
    sync::sync_popular(&state.tmdb, &state.cache, 1).await.unwrap();

    let (fight_club, genres) =
        state.cache.get_movie_by_tmdb_id(550).await.unwrap().unwrap();
    let links = movie_genre::Entity::find()
        .filter(movie_genre::Column::MovieId.eq(fight_club.id))
        .count(&state.db)
        .await
        .unwrap();
    assert_eq!(links, 2);

    let names: Vec<&str> = genres.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Action", "Adventure"]);
}

#[tokio::test]
async fn popular_sync_without_genres_skips_links() {
    let server = MockServer::start().await;
    mount_popular(&server).await;
    let state = common::test_state(&server).await;

    // no genre sync first, join rows are skipped but movies still land
    sync::sync_popular(&state.tmdb, &state.cache, 1).await.unwrap();

    let movies = movie::Entity::find().count(&state.db).await.unwrap();
    assert_eq!(movies, 2);
    let links = movie_genre::Entity::find().count(&state.db).await.unwrap();
    assert_eq!(links, 0);
}

#[tokio::test]
async fn popular_sync_fails_when_every_page_fails() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let state = common::test_state(&server).await;

    let res = sync::sync_popular(&state.tmdb, &state.cache, 2).await;
    assert!(res.is_err());

    let count = movie::Entity::find().count(&state.db).await.unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn popular_sync_keeps_going_past_a_failed_page() {
    let server = MockServer::start().await;
    mount_genres(&server).await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(common::popular_fixture()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/movie/popular"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let state = common::test_state(&server).await;

    sync::sync_genres(&state.tmdb, &state.cache).await.unwrap();
    let report = sync::sync_popular(&state.tmdb, &state.cache, 2).await.unwrap();
    assert_eq!(report.created, 2);
    assert_eq!(report.pages_failed, 1);
}
