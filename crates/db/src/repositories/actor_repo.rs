//! Repository for the `actors` table.

use chrono::Utc;
use reelvault_core::types::DbId;
use sqlx::{Executor, Sqlite, SqliteConnection};

use crate::models::actor::Actor;

/// Column list for queries built with `format!`. Queries run on a generic
/// executor use literal strings instead.
pub(crate) const COLUMNS: &str = "id, name, movie_id, created_at";

/// Actors have no life of their own: rows are written and removed only as
/// part of a movie's create/update/delete.
pub struct ActorRepo;

impl ActorRepo {
    /// Find an actor by its internal ID.
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<Actor>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Actor>(
            "SELECT id, name, movie_id, created_at FROM actors WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(executor)
        .await
    }

    /// List the cast of a movie in insertion order.
    pub async fn list_by_movie<'e, E>(executor: E, movie_id: DbId) -> Result<Vec<Actor>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_as::<_, Actor>(
            "SELECT id, name, movie_id, created_at FROM actors WHERE movie_id = ? ORDER BY id ASC",
        )
        .bind(movie_id)
        .fetch_all(executor)
        .await
    }

    /// Insert one actor row per name for the given movie.
    pub(crate) async fn insert_cast(
        conn: &mut SqliteConnection,
        movie_id: DbId,
        names: &[String],
    ) -> Result<Vec<Actor>, sqlx::Error> {
        let query = format!(
            "INSERT INTO actors (name, movie_id, created_at) VALUES (?, ?, ?) RETURNING {COLUMNS}"
        );
        let now = Utc::now();
        let mut actors = Vec::with_capacity(names.len());

        for name in names {
            let actor = sqlx::query_as::<_, Actor>(&query)
                .bind(name)
                .bind(movie_id)
                .bind(now)
                .fetch_one(&mut *conn)
                .await?;
            actors.push(actor);
        }

        Ok(actors)
    }

    /// Remove the whole cast of a movie. Returns the number of rows removed.
    pub(crate) async fn delete_by_movie(
        conn: &mut SqliteConnection,
        movie_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM actors WHERE movie_id = ?")
            .bind(movie_id)
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }
}
