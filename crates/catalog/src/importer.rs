//! Batch import of the plain-text catalog feed.
//!
//! An import runs through five phases. Reading, mapping and validating
//! happen per record, and a record that fails any of them is reported and
//! left out of persistence without affecting its siblings. Persisting then
//! creates every remaining record (see [`PersistMode`]) and summarizing
//! partitions the outcomes.

use std::io::{self, BufRead};

use futures::future::join_all;
use reelvault_core::error::{CoreError, FailureCode};
use reelvault_core::import::{import_label, map_record, MalformedRecord, RecordBlocks};
use reelvault_core::movie::NewMovie;
use reelvault_core::validation::{validate_create, FieldFailure};
use reelvault_db::models::movie::MovieWithActors;
use reelvault_db::repositories::MovieRepo;
use reelvault_db::{DbPool, RepoError};
use serde::Serialize;
use serde_json::Value;

use crate::config::PersistMode;
use crate::error::CatalogResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Reading,
    Mapping,
    Validating,
    Persisting,
    Summarizing,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reading => "reading",
            Self::Mapping => "mapping",
            Self::Validating => "validating",
            Self::Persisting => "persisting",
            Self::Summarizing => "summarizing",
        }
    }
}

impl std::fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure attributed to one record of the feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportFailure {
    /// 1-based position of the record in the feed.
    pub record: usize,
    pub field: String,
    /// The feed's own label for `field` (`Release Year` for `year`), when
    /// one exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<&'static str>,
    pub code: FailureCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl ImportFailure {
    fn from_field(record: usize, failure: FieldFailure) -> Self {
        Self {
            record,
            label: import_label(&failure.field),
            field: failure.field,
            code: failure.code,
            value: failure.value,
        }
    }

    fn malformed(record: usize, err: MalformedRecord) -> Self {
        match err {
            MalformedRecord::UnknownField { label, line } => Self {
                record,
                field: label,
                label: None,
                code: FailureCode::UnknownField,
                value: Some(Value::from(line)),
            },
        }
    }
}

/// Result of one import call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    /// Movies created by this import, in feed order.
    pub persisted: Vec<MovieWithActors>,
    /// Failures in feed order.
    pub failures: Vec<ImportFailure>,
    pub imported_count: usize,
    /// Catalog size after the import.
    pub total_count: i64,
}

impl ImportSummary {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// A record that passed mapping and validation.
#[derive(Debug)]
struct Candidate {
    record: usize,
    movie: NewMovie,
}

enum Attempt {
    Persisted(MovieWithActors),
    Failed(Vec<ImportFailure>),
}

// ---------------------------------------------------------------------------
// Importer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BatchImporter {
    pool: DbPool,
    mode: PersistMode,
}

impl BatchImporter {
    pub fn new(pool: DbPool, mode: PersistMode) -> Self {
        Self { pool, mode }
    }

    /// Run one import over a feed.
    ///
    /// Per-record failures are collected in the summary. An `Err` means the
    /// import as a whole failed: the stream could not be read (nothing is
    /// persisted), or storage raised an error that cannot be attributed to
    /// a record.
    pub async fn import<R: BufRead>(&self, reader: R) -> CatalogResult<ImportSummary> {
        enter(ImportPhase::Reading, 0);
        let blocks = RecordBlocks::from_reader(reader).collect::<io::Result<Vec<_>>>()?;

        enter(ImportPhase::Mapping, blocks.len());
        let mut failures = Vec::new();
        let mut requests = Vec::with_capacity(blocks.len());
        for (index, block) in blocks.iter().enumerate() {
            let record = index + 1;
            match map_record(block) {
                Ok(request) => requests.push((record, request)),
                Err(err) => {
                    tracing::debug!(record, line = block.first_line(), error = %err, "Record not mapped");
                    failures.push(ImportFailure::malformed(record, err));
                }
            }
        }

        enter(ImportPhase::Validating, requests.len());
        let mut candidates = Vec::with_capacity(requests.len());
        for (record, request) in requests {
            match validate_create(&request) {
                Ok(movie) => candidates.push(Candidate { record, movie }),
                Err(field_failures) => failures.extend(
                    field_failures
                        .into_iter()
                        .map(|f| ImportFailure::from_field(record, f)),
                ),
            }
        }

        enter(ImportPhase::Persisting, candidates.len());
        let attempts = match self.mode {
            PersistMode::Savepoint => self.persist_in_savepoints(&candidates).await?,
            PersistMode::Independent => self.persist_independently(&candidates).await?,
        };

        enter(ImportPhase::Summarizing, attempts.len());
        let mut persisted = Vec::new();
        for attempt in attempts {
            match attempt {
                Attempt::Persisted(movie) => persisted.push(movie),
                Attempt::Failed(record_failures) => failures.extend(record_failures),
            }
        }
        failures.sort_by_key(|f| f.record);

        let total_count = MovieRepo::count(&self.pool).await?;
        let summary = ImportSummary {
            imported_count: persisted.len(),
            persisted,
            failures,
            total_count,
        };

        tracing::info!(
            mode = self.mode.as_str(),
            records = blocks.len(),
            imported = summary.imported_count,
            failed = summary.failures.len(),
            total = summary.total_count,
            "Import finished",
        );
        Ok(summary)
    }

    /// One transaction for the whole batch, one savepoint per record.
    ///
    /// The transaction holds a single connection, so attempts are issued in
    /// turn. A record's failure only rolls back its own savepoint.
    async fn persist_in_savepoints(&self, candidates: &[Candidate]) -> CatalogResult<Vec<Attempt>> {
        let mut tx = self.pool.begin().await?;
        let mut attempts = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let mut savepoint = sqlx::Connection::begin(&mut *tx).await?;
            let result = MovieRepo::create_in(&mut savepoint, &candidate.movie).await;
            if result.is_ok() {
                savepoint.commit().await?;
            } else {
                savepoint.rollback().await?;
            }
            attempts.push(settle(candidate.record, result)?);
        }

        tx.commit().await?;
        Ok(attempts)
    }

    /// Each record in its own transaction, all attempts in flight at once.
    async fn persist_independently(&self, candidates: &[Candidate]) -> CatalogResult<Vec<Attempt>> {
        let results = join_all(candidates.iter().map(|candidate| async move {
            let result = MovieRepo::create(&self.pool, &candidate.movie).await;
            (candidate.record, result)
        }))
        .await;

        let attempts = results
            .into_iter()
            .map(|(record, result)| settle(record, result))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(attempts)
    }
}

fn enter(phase: ImportPhase, records: usize) {
    tracing::debug!(%phase, records, "Import phase");
}

/// Attribute a create outcome to its record. Errors with no field to blame
/// are passed back up and abort the import.
fn settle(
    record: usize,
    result: Result<MovieWithActors, RepoError>,
) -> Result<Attempt, RepoError> {
    match result {
        Ok(movie) => Ok(Attempt::Persisted(movie)),
        Err(RepoError::Core(CoreError::Conflict { field, value })) => {
            tracing::debug!(record, %value, "Duplicate title in import");
            Ok(Attempt::Failed(vec![ImportFailure {
                record,
                field: field.to_string(),
                label: import_label(field),
                code: FailureCode::MovieExists,
                value: Some(Value::from(value)),
            }]))
        }
        Err(RepoError::Core(CoreError::Validation(field_failures))) => Ok(Attempt::Failed(
            field_failures
                .into_iter()
                .map(|f| ImportFailure::from_field(record, f))
                .collect(),
        )),
        Err(err) => Err(err),
    }
}
