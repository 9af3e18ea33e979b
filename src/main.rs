use std::{sync::Arc, time::Duration};

use clap::{Parser, Subcommand};
use popcornflix::{AppState, cache::MovieCache, config::Config, db, routes, sync, tmdb::TmdbClient};

#[derive(Parser)]
#[command(name = "popcornflix", about = "Movie metadata API backed by TMDb")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API server
    Serve,
    /// Pull the TMDb genre list into the local cache
    SyncGenres,
    /// Pull pages of TMDb's popular listing into the local cache
    SyncPopular {
        /// Number of pages to fetch (defaults to SYNC_PAGES)
        #[arg(long)]
        pages: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,popcornflix=debug,sqlx=warn".to_string()),
        )
        .init();

    let cli = Cli::parse();
    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent("popcornflix/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let db = db::connect_and_migrate(&config.database_url).await?;
    let cache = MovieCache::new(db.clone());
    let tmdb = Arc::new(TmdbClient::new(
        http,
        config.tmdb_bearer_token.clone(),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    ));

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = Arc::new(AppState { config: config.clone(), db, cache, tmdb });
            let app = routes::router(state);

            let listener = tokio::net::TcpListener::bind(config.addr).await?;
            tracing::info!(addr = %config.addr, "listening");
            axum::serve(listener, app).await?;
        },
        Command::SyncGenres => {
            let report = sync::sync_genres(&tmdb, &cache).await?;
            tracing::info!(created = report.created, updated = report.updated, "genre sync done");
        },
        Command::SyncPopular { pages } => {
            let pages = pages.unwrap_or(config.sync_pages);
            let report = sync::sync_popular(&tmdb, &cache, pages).await?;
            tracing::info!(
                created = report.created,
                updated = report.updated,
                pages_failed = report.pages_failed,
                "popular movie sync done"
            );
        },
    }

    Ok(())
}
