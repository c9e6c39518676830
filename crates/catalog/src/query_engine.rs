//! Filtered, sorted and paginated reads over the catalog.

use reelvault_core::query::{MovieFilterSpec, MovieQuery};
use reelvault_db::models::movie::MovieWithActors;
use reelvault_db::repositories::MovieRepo;
use reelvault_db::DbPool;

use crate::error::CatalogResult;

/// One page of query results plus the unfiltered catalog size.
#[derive(Debug, Clone)]
pub struct MoviePage {
    pub movies: Vec<MovieWithActors>,
    pub total: i64,
}

#[derive(Debug, Clone)]
pub struct QueryEngine {
    pool: DbPool,
    default_limit: i64,
    max_limit: i64,
}

impl QueryEngine {
    pub fn new(pool: DbPool, default_limit: i64, max_limit: i64) -> Self {
        Self {
            pool,
            default_limit,
            max_limit,
        }
    }

    /// Normalize listing parameters with this engine's page-size bounds.
    pub fn spec(&self, query: &MovieQuery) -> MovieFilterSpec {
        MovieFilterSpec::from_query(query, self.default_limit, self.max_limit)
    }

    pub async fn list(&self, query: &MovieQuery) -> CatalogResult<MoviePage> {
        let spec = self.spec(query);
        tracing::debug!(
            title = ?spec.title_pattern,
            actor = ?spec.actor_pattern,
            sort = ?spec.sort,
            order = spec.order.as_sql(),
            limit = spec.limit,
            offset = spec.offset,
            "Listing movies",
        );

        let (movies, total) = tokio::try_join!(
            MovieRepo::query(&self.pool, &spec),
            MovieRepo::count(&self.pool),
        )?;

        Ok(MoviePage { movies, total })
    }
}
