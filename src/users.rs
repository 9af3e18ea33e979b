//! User accounts and the per-user favorites/watchlist join tables.

use std::collections::HashMap;

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};

use crate::{
    cache::now_sec,
    entities::{favorite, movie, user, watchlist},
    error::{ApiError, ApiResult},
    models::ProfileUpdateRequest,
};

pub struct NewUser {
    pub email: String,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

pub async fn create_user(db: &DatabaseConnection, new: NewUser) -> ApiResult<user::Model> {
    let duplicate = user::Entity::find()
        .filter(user::Column::Email.eq(&new.email))
        .one(db)
        .await?
        .is_some();
    if duplicate {
        return Err(ApiError::validation("A user with this email already exists."));
    }

    let username_taken = user::Entity::find()
        .filter(user::Column::Username.eq(&new.username))
        .one(db)
        .await?
        .is_some();
    if username_taken {
        return Err(ApiError::validation("A user with this username already exists."));
    }

    let model = user::ActiveModel {
        id: Default::default(),
        email: Set(new.email),
        username: Set(new.username),
        first_name: Set(new.first_name),
        last_name: Set(new.last_name),
        password_hash: Set(new.password_hash),
        is_active: Set(true),
        date_joined: Set(now_sec()),
    };

    let res = user::Entity::insert(model).exec(db).await?;
    let created = user::Entity::find_by_id(res.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("user row missing after insert"))?;
    Ok(created)
}

pub async fn find_by_email(
    db: &DatabaseConnection,
    email: &str,
) -> ApiResult<Option<user::Model>> {
    let found = user::Entity::find().filter(user::Column::Email.eq(email)).one(db).await?;
    Ok(found)
}

pub async fn find_by_id(db: &DatabaseConnection, id: i32) -> ApiResult<Option<user::Model>> {
    let found = user::Entity::find_by_id(id).one(db).await?;
    Ok(found)
}

pub async fn update_profile(
    db: &DatabaseConnection,
    current: user::Model,
    update: ProfileUpdateRequest,
) -> ApiResult<user::Model> {
    let user_id = current.id;
    let mut am: user::ActiveModel = current.into();
    if let Some(username) = update.username {
        let username = username.trim().to_string();
        if username.is_empty() {
            return Err(ApiError::validation("username must not be empty"));
        }
        let taken = user::Entity::find()
            .filter(user::Column::Username.eq(&username))
            .filter(user::Column::Id.ne(user_id))
            .one(db)
            .await?
            .is_some();
        if taken {
            return Err(ApiError::validation("A user with this username already exists."));
        }
        am.username = Set(username);
    }
    if let Some(first_name) = update.first_name {
        am.first_name = Set(first_name.trim().to_string());
    }
    if let Some(last_name) = update.last_name {
        am.last_name = Set(last_name.trim().to_string());
    }
    let updated = am.update(db).await?;
    Ok(updated)
}

async fn require_movie(db: &DatabaseConnection, movie_id: i32) -> ApiResult<movie::Model> {
    movie::Entity::find_by_id(movie_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::validation("Movie not found."))
}

fn movies_by_id(rows: Vec<movie::Model>) -> HashMap<i32, movie::Model> {
    rows.into_iter().map(|m| (m.id, m)).collect()
}

// ---------------------------------------------------------------------------
// Favorites
// ---------------------------------------------------------------------------

pub async fn list_favorites(
    db: &DatabaseConnection,
    user_id: i32,
) -> ApiResult<Vec<(favorite::Model, movie::Model)>> {
    let entries = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .order_by_desc(favorite::Column::CreatedAt)
        .all(db)
        .await?;

    let movie_ids: Vec<i32> = entries.iter().map(|e| e.movie_id).collect();
    let movies = movie::Entity::find()
        .filter(movie::Column::Id.is_in(movie_ids))
        .all(db)
        .await?;
    let by_id = movies_by_id(movies);

    Ok(entries
        .into_iter()
        .filter_map(|e| by_id.get(&e.movie_id).cloned().map(|m| (e, m)))
        .collect())
}

pub async fn add_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
) -> ApiResult<(favorite::Model, movie::Model)> {
    let movie = require_movie(db, movie_id).await?;

    let exists = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::MovieId.eq(movie_id))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Err(ApiError::validation("Movie is already in favorites."));
    }

    let model = favorite::ActiveModel {
        id: Default::default(),
        user_id: Set(user_id),
        movie_id: Set(movie_id),
        created_at: Set(now_sec()),
    };
    let res = favorite::Entity::insert(model).exec(db).await?;
    let row = favorite::Entity::find_by_id(res.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("favorite row missing after insert"))?;
    Ok((row, movie))
}

/// Removes by row id, scoped to the caller. Absent rows are a 404.
pub async fn remove_favorite(db: &DatabaseConnection, user_id: i32, id: i32) -> ApiResult<()> {
    let res = favorite::Entity::delete_many()
        .filter(favorite::Column::Id.eq(id))
        .filter(favorite::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Favorite not found"));
    }
    Ok(())
}

pub async fn is_favorite(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
) -> ApiResult<bool> {
    let exists = favorite::Entity::find()
        .filter(favorite::Column::UserId.eq(user_id))
        .filter(favorite::Column::MovieId.eq(movie_id))
        .one(db)
        .await?
        .is_some();
    Ok(exists)
}

// ---------------------------------------------------------------------------
// Watchlist
// ---------------------------------------------------------------------------

pub async fn list_watchlist(
    db: &DatabaseConnection,
    user_id: i32,
) -> ApiResult<Vec<(watchlist::Model, movie::Model)>> {
    let entries = watchlist::Entity::find()
        .filter(watchlist::Column::UserId.eq(user_id))
        .order_by_desc(watchlist::Column::CreatedAt)
        .all(db)
        .await?;

    let movie_ids: Vec<i32> = entries.iter().map(|e| e.movie_id).collect();
    let movies = movie::Entity::find()
        .filter(movie::Column::Id.is_in(movie_ids))
        .all(db)
        .await?;
    let by_id = movies_by_id(movies);

    Ok(entries
        .into_iter()
        .filter_map(|e| by_id.get(&e.movie_id).cloned().map(|m| (e, m)))
        .collect())
}

pub async fn add_watchlist(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
) -> ApiResult<(watchlist::Model, movie::Model)> {
    let movie = require_movie(db, movie_id).await?;

    let exists = watchlist::Entity::find()
        .filter(watchlist::Column::UserId.eq(user_id))
        .filter(watchlist::Column::MovieId.eq(movie_id))
        .one(db)
        .await?
        .is_some();
    if exists {
        return Err(ApiError::validation("Movie is already in watchlist."));
    }

    let model = watchlist::ActiveModel {
        id: Default::default(),
        user_id: Set(user_id),
        movie_id: Set(movie_id),
        created_at: Set(now_sec()),
    };
    let res = watchlist::Entity::insert(model).exec(db).await?;
    let row = watchlist::Entity::find_by_id(res.last_insert_id)
        .one(db)
        .await?
        .ok_or_else(|| anyhow::anyhow!("watchlist row missing after insert"))?;
    Ok((row, movie))
}

pub async fn remove_watchlist(db: &DatabaseConnection, user_id: i32, id: i32) -> ApiResult<()> {
    let res = watchlist::Entity::delete_many()
        .filter(watchlist::Column::Id.eq(id))
        .filter(watchlist::Column::UserId.eq(user_id))
        .exec(db)
        .await?;
    if res.rows_affected == 0 {
        return Err(ApiError::not_found("Watchlist entry not found"));
    }
    Ok(())
}

pub async fn is_in_watchlist(
    db: &DatabaseConnection,
    user_id: i32,
    movie_id: i32,
) -> ApiResult<bool> {
    let exists = watchlist::Entity::find()
        .filter(watchlist::Column::UserId.eq(user_id))
        .filter(watchlist::Column::MovieId.eq(movie_id))
        .one(db)
        .await?
        .is_some();
    Ok(exists)
}
