use std::collections::HashMap;

use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait, sea_query::OnConflict,
};

use crate::{
    entities::{genre, movie, movie_genre},
    error::ApiResult,
    models::TmdbMovie,
};

/// Filters applied to local movie listings.
#[derive(Debug, Default, Clone)]
pub struct MovieFilter {
    pub search: Option<String>,
    pub genre_tmdb_id: Option<i32>,
    pub min_rating: Option<f64>,
}

/// Persistent store for the synchronized subset of TMDb records. The TMDb id
/// is the natural key; upserts key on it so re-running a sync never creates
/// duplicates.
#[derive(Clone)]
pub struct MovieCache {
    db: DatabaseConnection,
}

impl MovieCache {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    /// Returns true when the genre was newly created.
    pub async fn upsert_genre(&self, tmdb_id: i32, name: &str) -> ApiResult<bool> {
        let existed = genre::Entity::find()
            .filter(genre::Column::TmdbId.eq(tmdb_id))
            .one(&self.db)
            .await?
            .is_some();

        let model = genre::ActiveModel {
            id: Default::default(),
            tmdb_id: Set(tmdb_id),
            name: Set(name.to_string()),
        };

        genre::Entity::insert(model)
            .on_conflict(
                OnConflict::column(genre::Column::TmdbId)
                    .update_columns([genre::Column::Name])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        Ok(!existed)
    }

    /// Upserts one movie keyed on its TMDb id. Returns the local id and
    /// whether the row was newly created. `created_at` is preserved across
    /// updates.
    pub async fn upsert_movie(&self, m: &TmdbMovie) -> ApiResult<(i32, bool)> {
        let existed = movie::Entity::find()
            .filter(movie::Column::TmdbId.eq(m.id))
            .one(&self.db)
            .await?
            .is_some();

        let now = now_sec();
        let model = movie::ActiveModel {
            id: Default::default(),
            tmdb_id: Set(m.id),
            title: Set(m.title.clone()),
            original_title: Set(m.original_title.clone()),
            overview: Set(m.overview.clone()),
            release_date: Set(normalize_release_date(m.release_date.as_deref())),
            runtime: Set(None),
            vote_average: Set(m.vote_average),
            vote_count: Set(m.vote_count),
            popularity: Set(m.popularity),
            poster_path: Set(m.poster_path.clone()),
            backdrop_path: Set(m.backdrop_path.clone()),
            adult: Set(m.adult),
            video: Set(m.video),
            original_language: Set(m.original_language.clone()),
            created_at: Set(now),
            updated_at: Set(now),
        };

        movie::Entity::insert(model)
            .on_conflict(
                OnConflict::column(movie::Column::TmdbId)
                    .update_columns([
                        movie::Column::Title,
                        movie::Column::OriginalTitle,
                        movie::Column::Overview,
                        movie::Column::ReleaseDate,
                        movie::Column::VoteAverage,
                        movie::Column::VoteCount,
                        movie::Column::Popularity,
                        movie::Column::PosterPath,
                        movie::Column::BackdropPath,
                        movie::Column::Adult,
                        movie::Column::Video,
                        movie::Column::OriginalLanguage,
                        movie::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        // last_insert_id is not reliable on a conflict-update, read it back
        let row = movie::Entity::find()
            .filter(movie::Column::TmdbId.eq(m.id))
            .one(&self.db)
            .await?
            .ok_or_else(|| anyhow::anyhow!("movie row missing after upsert"))?;

        Ok((row.id, !existed))
    }

    /// Replaces a movie's genre join rows. Genre ids without a matching
    /// synced genre are skipped with a warning.
    pub async fn set_movie_genres(&self, movie_id: i32, genre_tmdb_ids: &[i32]) -> ApiResult<()> {
        let txn = self.db.begin().await?;

        movie_genre::Entity::delete_many()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .exec(&txn)
            .await?;

        for tmdb_id in genre_tmdb_ids {
            let Some(g) = genre::Entity::find()
                .filter(genre::Column::TmdbId.eq(*tmdb_id))
                .one(&txn)
                .await?
            else {
                tracing::warn!(
                    genre_tmdb_id = tmdb_id,
                    "genre not in local cache, run sync-genres first"
                );
                continue;
            };

            let link = movie_genre::ActiveModel {
                id: Default::default(),
                movie_id: Set(movie_id),
                genre_id: Set(g.id),
            };
            movie_genre::Entity::insert(link).exec(&txn).await?;
        }

        txn.commit().await?;
        Ok(())
    }

    pub async fn get_movie(&self, id: i32) -> ApiResult<Option<(movie::Model, Vec<genre::Model>)>> {
        let Some(row) = movie::Entity::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };
        let genres = self.genres_for_movie(row.id).await?;
        Ok(Some((row, genres)))
    }

    pub async fn get_movie_by_tmdb_id(
        &self,
        tmdb_id: i32,
    ) -> ApiResult<Option<(movie::Model, Vec<genre::Model>)>> {
        let Some(row) = movie::Entity::find()
            .filter(movie::Column::TmdbId.eq(tmdb_id))
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };
        let genres = self.genres_for_movie(row.id).await?;
        Ok(Some((row, genres)))
    }

    pub async fn genres_for_movie(&self, movie_id: i32) -> ApiResult<Vec<genre::Model>> {
        let links = movie_genre::Entity::find()
            .filter(movie_genre::Column::MovieId.eq(movie_id))
            .all(&self.db)
            .await?;
        let genre_ids: Vec<i32> = links.iter().map(|l| l.genre_id).collect();
        if genre_ids.is_empty() {
            return Ok(Vec::new());
        }
        let genres = genre::Entity::find()
            .filter(genre::Column::Id.is_in(genre_ids))
            .order_by_asc(genre::Column::Name)
            .all(&self.db)
            .await?;
        Ok(genres)
    }

    /// Genres for a batch of movies, keyed by movie id.
    pub async fn genres_for_movies(
        &self,
        movie_ids: &[i32],
    ) -> ApiResult<HashMap<i32, Vec<genre::Model>>> {
        let mut out: HashMap<i32, Vec<genre::Model>> = HashMap::new();
        if movie_ids.is_empty() {
            return Ok(out);
        }

        let links = movie_genre::Entity::find()
            .filter(movie_genre::Column::MovieId.is_in(movie_ids.to_vec()))
            .all(&self.db)
            .await?;

        let genre_ids: Vec<i32> = links.iter().map(|l| l.genre_id).collect();
        let genres = genre::Entity::find()
            .filter(genre::Column::Id.is_in(genre_ids))
            .all(&self.db)
            .await?;
        let by_id: HashMap<i32, genre::Model> = genres.into_iter().map(|g| (g.id, g)).collect();

        for link in links {
            if let Some(g) = by_id.get(&link.genre_id) {
                out.entry(link.movie_id).or_default().push(g.clone());
            }
        }
        Ok(out)
    }

    /// Filtered, paginated local listing ordered by popularity then rating.
    /// Returns the page rows and the total match count.
    pub async fn list_movies(
        &self,
        filter: &MovieFilter,
        page: u64,
        page_size: u64,
    ) -> ApiResult<(Vec<movie::Model>, u64)> {
        let mut query = movie::Entity::find();

        if let Some(search) = &filter.search {
            query = query.filter(movie::Column::Title.contains(search));
        }
        if let Some(min_rating) = filter.min_rating {
            query = query.filter(movie::Column::VoteAverage.gte(min_rating));
        }
        if let Some(genre_tmdb_id) = filter.genre_tmdb_id {
            let Some(g) = genre::Entity::find()
                .filter(genre::Column::TmdbId.eq(genre_tmdb_id))
                .one(&self.db)
                .await?
            else {
                return Ok((Vec::new(), 0));
            };
            let links = movie_genre::Entity::find()
                .filter(movie_genre::Column::GenreId.eq(g.id))
                .all(&self.db)
                .await?;
            let movie_ids: Vec<i32> = links.iter().map(|l| l.movie_id).collect();
            query = query.filter(movie::Column::Id.is_in(movie_ids));
        }

        let query = query
            .order_by_desc(movie::Column::Popularity)
            .order_by_desc(movie::Column::VoteAverage);

        let paginator = query.paginate(&self.db, page_size);
        let total = paginator.num_items().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((rows, total))
    }

    pub async fn list_genres(&self) -> ApiResult<Vec<genre::Model>> {
        let genres =
            genre::Entity::find().order_by_asc(genre::Column::Name).all(&self.db).await?;
        Ok(genres)
    }
}

fn normalize_release_date(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    raw.parse::<jiff::civil::Date>().ok().map(|d| d.to_string())
}

pub fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_date_normalization() {
        assert_eq!(normalize_release_date(Some("2023-10-20")), Some("2023-10-20".to_string()));
        assert_eq!(normalize_release_date(Some("")), None);
        assert_eq!(normalize_release_date(Some("not-a-date")), None);
        assert_eq!(normalize_release_date(None), None);
    }
}
