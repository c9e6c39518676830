//! Repository for the `movies` table and its owned `actors` rows.

use std::collections::HashMap;

use chrono::Utc;
use reelvault_core::movie::{MoviePatch, NewMovie};
use reelvault_core::query::{title_sort_key, MovieFilterSpec, SortKey, SortOrder};
use reelvault_core::types::DbId;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error::{classify_write_error, RepoError};
use crate::models::actor::Actor;
use crate::models::movie::{Movie, MovieWithActors};
use crate::repositories::actor_repo::{self, ActorRepo};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, title, year, format, created_at, updated_at";

/// Same columns qualified with the `m` alias, for joined queries.
const MOVIE_COLUMNS: &str = "m.id, m.title, m.year, m.format, m.created_at, m.updated_at";

/// Provides CRUD and listing operations for movies together with their cast.
pub struct MovieRepo;

impl MovieRepo {
    /// Insert a movie and its cast in a single transaction.
    ///
    /// A duplicate title surfaces as `CoreError::Conflict` on `title`.
    pub async fn create(pool: &SqlitePool, input: &NewMovie) -> Result<MovieWithActors, RepoError> {
        let mut tx = pool.begin().await?;
        let movie = Self::create_in(&mut tx, input).await?;
        tx.commit().await?;
        Ok(movie)
    }

    /// Insert a movie and its cast on a caller-provided connection.
    ///
    /// Nothing is committed here; the caller owns the enclosing transaction
    /// or savepoint and decides whether to keep the rows.
    pub async fn create_in(
        conn: &mut SqliteConnection,
        input: &NewMovie,
    ) -> Result<MovieWithActors, RepoError> {
        let query = format!(
            "INSERT INTO movies (title, title_key, year, format, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING {COLUMNS}"
        );
        let now = Utc::now();
        let movie = sqlx::query_as::<_, Movie>(&query)
            .bind(&input.title)
            .bind(title_sort_key(&input.title))
            .bind(input.year)
            .bind(input.format.as_str())
            .bind(now)
            .bind(now)
            .fetch_one(&mut *conn)
            .await
            .map_err(|e| classify_write_error(e, &input.title))?;

        let actors = ActorRepo::insert_cast(conn, movie.id, &input.actors).await?;

        Ok(MovieWithActors { movie, actors })
    }

    /// Find a movie by its internal ID, with its full cast.
    pub async fn find_by_id(
        pool: &SqlitePool,
        id: DbId,
    ) -> Result<Option<MovieWithActors>, RepoError> {
        let query = format!("SELECT {COLUMNS} FROM movies WHERE id = ?");
        let movie = sqlx::query_as::<_, Movie>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match movie {
            Some(movie) => {
                let actors = ActorRepo::list_by_movie(pool, movie.id).await?;
                Ok(Some(MovieWithActors { movie, actors }))
            }
            None => Ok(None),
        }
    }

    /// Update a movie. Only non-`None` fields in `patch` are applied.
    ///
    /// If `patch.actors` is `Some`, the cast is replaced wholesale; otherwise
    /// the existing cast is kept. Returns `None` if no row with `id` exists.
    pub async fn update(
        pool: &SqlitePool,
        id: DbId,
        patch: &MoviePatch,
    ) -> Result<Option<MovieWithActors>, RepoError> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE movies SET
                title = COALESCE(?, title),
                title_key = COALESCE(?, title_key),
                year = COALESCE(?, year),
                format = COALESCE(?, format),
                updated_at = ?
             WHERE id = ?
             RETURNING {COLUMNS}"
        );
        let movie = sqlx::query_as::<_, Movie>(&query)
            .bind(&patch.title)
            .bind(patch.title.as_deref().map(title_sort_key))
            .bind(patch.year)
            .bind(patch.format.map(|f| f.as_str()))
            .bind(Utc::now())
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| classify_write_error(e, patch.title.as_deref().unwrap_or_default()))?;

        let Some(movie) = movie else {
            return Ok(None);
        };

        let actors = match &patch.actors {
            Some(names) => {
                ActorRepo::delete_by_movie(&mut tx, id).await?;
                ActorRepo::insert_cast(&mut tx, id, names).await?
            }
            None => ActorRepo::list_by_movie(&mut *tx, id).await?,
        };

        tx.commit().await?;
        Ok(Some(MovieWithActors { movie, actors }))
    }

    /// Delete a movie and its cast. Returns `true` if the movie existed.
    ///
    /// Actor rows are removed explicitly in the same transaction before the
    /// movie row; the foreign key's `ON DELETE CASCADE` is only a backstop.
    pub async fn delete_by_id(pool: &SqlitePool, id: DbId) -> Result<bool, RepoError> {
        let mut tx = pool.begin().await?;

        let removed_actors = ActorRepo::delete_by_movie(&mut tx, id).await?;
        let result = sqlx::query("DELETE FROM movies WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::debug!(movie_id = id, removed_actors, "Deleted movie with cast");
        }
        Ok(deleted)
    }

    /// Total number of movies in the catalog, ignoring any filter.
    pub async fn count(pool: &SqlitePool) -> Result<i64, RepoError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM movies")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Filter, sort and paginate movies, attaching their cast.
    ///
    /// Without predicates every movie qualifies and carries its full cast.
    /// With predicates the cast join carries the condition: a movie
    /// qualifies when at least one of its cast rows satisfies it, and only
    /// those rows are attached. Pagination counts movies, not actor rows.
    pub async fn query(
        pool: &SqlitePool,
        spec: &MovieFilterSpec,
    ) -> Result<Vec<MovieWithActors>, RepoError> {
        let condition = join_condition(spec);
        let order = order_clause(spec.sort, spec.order);

        let query = match &condition {
            Some(condition) => format!(
                "SELECT {MOVIE_COLUMNS} FROM movies m
                 WHERE EXISTS (
                     SELECT 1 FROM actors a WHERE a.movie_id = m.id AND {condition}
                 )
                 ORDER BY {order}
                 LIMIT ? OFFSET ?"
            ),
            None => format!(
                "SELECT {MOVIE_COLUMNS} FROM movies m
                 ORDER BY {order}
                 LIMIT ? OFFSET ?"
            ),
        };

        let mut movies_query = sqlx::query_as::<_, Movie>(&query);
        for pattern in patterns(spec) {
            movies_query = movies_query.bind(pattern);
        }
        let movies = movies_query
            .bind(spec.limit)
            .bind(spec.offset)
            .fetch_all(pool)
            .await?;

        let mut cast = Self::load_cast(pool, &movies, spec, condition.as_deref()).await?;

        Ok(movies
            .into_iter()
            .map(|movie| {
                let actors = cast.remove(&movie.id).unwrap_or_default();
                MovieWithActors { movie, actors }
            })
            .collect())
    }

    /// Batch-load the cast rows for a page of movies, grouped by movie ID.
    async fn load_cast(
        pool: &SqlitePool,
        movies: &[Movie],
        spec: &MovieFilterSpec,
        condition: Option<&str>,
    ) -> Result<HashMap<DbId, Vec<Actor>>, RepoError> {
        if movies.is_empty() {
            return Ok(HashMap::new());
        }

        let placeholders = vec!["?"; movies.len()].join(", ");
        let filter = condition
            .map(|c| format!(" AND {c}"))
            .unwrap_or_default();
        let columns = actor_repo::COLUMNS
            .split(", ")
            .map(|c| format!("a.{c}"))
            .collect::<Vec<_>>()
            .join(", ");
        let query = format!(
            "SELECT {columns} FROM actors a
             JOIN movies m ON m.id = a.movie_id
             WHERE a.movie_id IN ({placeholders}){filter}
             ORDER BY a.id ASC"
        );

        let mut cast_query = sqlx::query_as::<_, Actor>(&query);
        for movie in movies {
            cast_query = cast_query.bind(movie.id);
        }
        for pattern in patterns(spec) {
            cast_query = cast_query.bind(pattern);
        }
        let actors = cast_query.fetch_all(pool).await?;

        let mut grouped: HashMap<DbId, Vec<Actor>> = HashMap::new();
        for actor in actors {
            grouped.entry(actor.movie_id).or_default().push(actor);
        }
        Ok(grouped)
    }
}

// ---------------------------------------------------------------------------
// SQL fragments
// ---------------------------------------------------------------------------

/// The cast join condition, or `None` when no predicate applies.
///
/// Title and actor predicates are combined with OR. Placeholders appear in
/// the same order as [`patterns`] yields values.
fn join_condition(spec: &MovieFilterSpec) -> Option<String> {
    let mut parts = Vec::with_capacity(2);
    if spec.title_pattern.is_some() {
        parts.push("m.title LIKE ? ESCAPE '\\'");
    }
    if spec.actor_pattern.is_some() {
        parts.push("a.name LIKE ? ESCAPE '\\'");
    }
    if parts.is_empty() {
        None
    } else {
        Some(format!("({})", parts.join(" OR ")))
    }
}

fn patterns(spec: &MovieFilterSpec) -> impl Iterator<Item = &str> {
    spec.title_pattern
        .iter()
        .chain(spec.actor_pattern.iter())
        .map(String::as_str)
}

/// Title sorts on the folded `title_key`; ties fall back to the raw title and
/// then the ID so pagination is stable.
fn order_clause(sort: SortKey, order: SortOrder) -> String {
    let dir = order.as_sql();
    match sort {
        SortKey::Id => format!("m.id {dir}"),
        SortKey::Title => format!("m.title_key {dir}, m.title {dir}, m.id ASC"),
        SortKey::Year => format!("m.year {dir}, m.id ASC"),
    }
}
