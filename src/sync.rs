//! Batch jobs that pull upstream listings and upsert them into the local
//! cache. Jobs are idempotent; a failed page is logged and skipped, pages
//! already committed stay committed, and the operator re-runs the job.

use tracing::{info, warn};

use crate::{
    cache::MovieCache,
    error::ApiResult,
    tmdb::{TmdbClient, TmdbError},
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncReport {
    pub created: u64,
    pub updated: u64,
    pub pages_failed: u32,
}

pub async fn sync_genres(tmdb: &TmdbClient, cache: &MovieCache) -> ApiResult<SyncReport> {
    let data = tmdb.genres().await?;

    let mut report = SyncReport::default();
    for g in &data.genres {
        if cache.upsert_genre(g.id, &g.name).await? {
            report.created += 1;
        } else {
            report.updated += 1;
        }
    }

    info!(created = report.created, updated = report.updated, "genre sync finished");
    Ok(report)
}

/// Pulls pages 1..=`pages` of TMDb's popular listing. Each page is committed
/// independently; the job only fails outright when no page succeeds.
pub async fn sync_popular(
    tmdb: &TmdbClient,
    cache: &MovieCache,
    pages: u32,
) -> ApiResult<SyncReport> {
    let mut report = SyncReport::default();
    let mut last_err: Option<TmdbError> = None;

    for page in 1..=pages {
        let data = match tmdb.popular(page).await {
            Ok(data) => data,
            Err(err) => {
                warn!(page, error = %err, "failed to fetch popular movies page");
                report.pages_failed += 1;
                last_err = Some(err);
                continue;
            },
        };

        for m in &data.results {
            let (movie_id, created) = cache.upsert_movie(m).await?;
            cache.set_movie_genres(movie_id, &m.genre_ids).await?;
            if created {
                report.created += 1;
            } else {
                report.updated += 1;
            }
        }
    }

    if report.pages_failed == pages {
        if let Some(err) = last_err {
            return Err(err.into());
        }
    }

    info!(
        created = report.created,
        updated = report.updated,
        pages_failed = report.pages_failed,
        "popular movie sync finished"
    );
    Ok(report)
}
