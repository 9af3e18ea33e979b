use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Movie::Table)
                    .if_not_exists()
                    .col(pk_auto(Movie::Id))
                    .col(integer(Movie::TmdbId))
                    .col(string(Movie::Title))
                    .col(string(Movie::OriginalTitle))
                    .col(text(Movie::Overview))
                    .col(string_null(Movie::ReleaseDate))
                    .col(integer_null(Movie::Runtime))
                    .col(double_null(Movie::VoteAverage))
                    .col(integer(Movie::VoteCount))
                    .col(double_null(Movie::Popularity))
                    .col(string_null(Movie::PosterPath))
                    .col(string_null(Movie::BackdropPath))
                    .col(boolean(Movie::Adult))
                    .col(boolean(Movie::Video))
                    .col(string(Movie::OriginalLanguage))
                    .col(big_integer(Movie::CreatedAt))
                    .col(big_integer(Movie::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_tmdb_id_unique")
                    .table(Movie::Table)
                    .col(Movie::TmdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_popularity")
                    .table(Movie::Table)
                    .col(Movie::Popularity)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Genre::Table)
                    .if_not_exists()
                    .col(pk_auto(Genre::Id))
                    .col(integer(Genre::TmdbId))
                    .col(string(Genre::Name))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_genre_tmdb_id_unique")
                    .table(Genre::Table)
                    .col(Genre::TmdbId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MovieGenre::Table)
                    .if_not_exists()
                    .col(pk_auto(MovieGenre::Id))
                    .col(integer(MovieGenre::MovieId))
                    .col(integer(MovieGenre::GenreId))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_movie_genre_unique")
                    .table(MovieGenre::Table)
                    .col(MovieGenre::MovieId)
                    .col(MovieGenre::GenreId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(MovieGenre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Genre::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Movie::Table).to_owned()).await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Movie {
    Table,
    Id,
    TmdbId,
    Title,
    OriginalTitle,
    Overview,
    ReleaseDate,
    Runtime,
    VoteAverage,
    VoteCount,
    Popularity,
    PosterPath,
    BackdropPath,
    Adult,
    Video,
    OriginalLanguage,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Genre {
    Table,
    Id,
    TmdbId,
    Name,
}

#[derive(DeriveIden)]
enum MovieGenre {
    Table,
    Id,
    MovieId,
    GenreId,
}
