//! The catalog's outer-API contract.
//!
//! Every operation returns either a response body or a [`CatalogError`]
//! that [`CatalogError::describe`] can render. Update and delete resolve the
//! movie first, so a missing id surfaces as `MOVIE_NOT_FOUND` before any
//! mutation is attempted.

use std::io::BufRead;

use reelvault_core::error::CoreError;
use reelvault_core::movie::{CreateMovie, UpdateMovie};
use reelvault_core::query::MovieQuery;
use reelvault_core::types::DbId;
use reelvault_core::validation::{validate_create, validate_update};
use reelvault_db::models::movie::MovieWithActors;
use reelvault_db::repositories::MovieRepo;
use reelvault_db::DbPool;

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::importer::BatchImporter;
use crate::query_engine::QueryEngine;
use crate::response::{ImportMeta, ImportResponse, ListMeta, ListResponse};

#[derive(Debug, Clone)]
pub struct CatalogService {
    pool: DbPool,
    importer: BatchImporter,
    queries: QueryEngine,
}

impl CatalogService {
    pub fn new(pool: DbPool, config: &CatalogConfig) -> Self {
        Self {
            importer: BatchImporter::new(pool.clone(), config.persist_mode),
            queries: QueryEngine::new(pool.clone(), config.default_limit, config.max_limit),
            pool,
        }
    }

    /// Load [`CatalogConfig`] from the environment, then [`connect`](Self::connect).
    pub async fn from_env() -> CatalogResult<Self> {
        let config = CatalogConfig::from_env()?;
        tracing::info!(
            database_url = %config.database_url,
            persist_mode = config.persist_mode.as_str(),
            "Loaded catalog configuration"
        );
        Self::connect(&config).await
    }

    /// Open the pool, check it answers, and apply pending migrations.
    pub async fn connect(config: &CatalogConfig) -> CatalogResult<Self> {
        let pool = reelvault_db::create_pool(&config.database_url, config.max_connections).await?;
        tracing::info!("Database connection pool created");

        reelvault_db::health_check(&pool).await?;
        tracing::info!("Database health check passed");

        reelvault_db::run_migrations(&pool).await?;
        tracing::info!("Database migrations applied");

        Ok(Self::new(pool, config))
    }

    pub async fn create_movie(&self, input: &CreateMovie) -> CatalogResult<MovieWithActors> {
        let movie = validate_create(input).map_err(CoreError::Validation)?;
        let created = MovieRepo::create(&self.pool, &movie).await?;
        tracing::info!(movie_id = created.movie.id, title = %created.movie.title, "Movie created");
        Ok(created)
    }

    pub async fn get_movie(&self, id: DbId) -> CatalogResult<MovieWithActors> {
        MovieRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    pub async fn update_movie(
        &self,
        id: DbId,
        input: &UpdateMovie,
    ) -> CatalogResult<MovieWithActors> {
        self.get_movie(id).await?;
        let patch = validate_update(input).map_err(CoreError::Validation)?;
        let updated = MovieRepo::update(&self.pool, id, &patch)
            .await?
            .ok_or_else(|| not_found(id))?;
        tracing::info!(movie_id = id, "Movie updated");
        Ok(updated)
    }

    pub async fn delete_movie(&self, id: DbId) -> CatalogResult<()> {
        self.get_movie(id).await?;
        if !MovieRepo::delete_by_id(&self.pool, id).await? {
            return Err(not_found(id));
        }
        tracing::info!(movie_id = id, "Movie deleted");
        Ok(())
    }

    pub async fn list_movies(&self, query: &MovieQuery) -> CatalogResult<ListResponse> {
        let page = self.queries.list(query).await?;
        Ok(ListResponse {
            data: page.movies,
            meta: ListMeta { total: page.total },
        })
    }

    /// Import a plain-text feed.
    ///
    /// If any record failed, the call returns [`CatalogError::AggregateImport`]
    /// carrying the full summary, including the movies that were persisted.
    pub async fn import_movies<R: BufRead>(&self, reader: R) -> CatalogResult<ImportResponse> {
        let summary = self.importer.import(reader).await?;
        if summary.has_failures() {
            tracing::warn!(
                imported = summary.imported_count,
                failed = summary.failures.len(),
                "Import finished with failures",
            );
            return Err(CatalogError::AggregateImport(summary));
        }

        Ok(ImportResponse {
            meta: ImportMeta {
                imported: summary.imported_count,
                total: summary.total_count,
            },
            data: summary.persisted,
        })
    }
}

fn not_found(id: DbId) -> CatalogError {
    CoreError::NotFound { entity: "movie", id }.into()
}
