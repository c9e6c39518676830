use reelvault_core::error::{CoreError, FailureCode};
use reelvault_db::RepoError;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::config::ConfigError;
use crate::importer::{ImportFailure, ImportSummary};

/// Error returned by catalog service operations.
///
/// Wraps [`CoreError`] for domain errors and adds the infrastructure
/// failures the service layer can run into. [`CatalogError::describe`]
/// turns any of them into a serializable [`ErrorDescription`].
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A domain-level error from `reelvault_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Reading the import stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// At least one import record failed. Carries the whole summary, so the
    /// records that did persist are still reported.
    #[error("Import finished with {} failed record(s)", .0.failures.len())]
    AggregateImport(ImportSummary),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Convenience type alias for service return values.
pub type CatalogResult<T> = Result<T, CatalogError>;

impl From<RepoError> for CatalogError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Core(core) => Self::Core(core),
            RepoError::Database(db) => Self::Database(db),
        }
    }
}

/// Transport-neutral error body: `{ code, fields, values, failures }`.
///
/// Empty members are omitted when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ErrorDescription {
    pub code: FailureCode,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub fields: Map<String, Value>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub values: Map<String, Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ImportFailure>,
}

impl ErrorDescription {
    fn new(code: FailureCode) -> Self {
        Self {
            code,
            fields: Map::new(),
            values: Map::new(),
            failures: Vec::new(),
        }
    }
}

impl CatalogError {
    /// Describe this error the way the outer API reports it.
    ///
    /// - `NotFound` → `MOVIE_NOT_FOUND` with the id under `fields`.
    /// - `Conflict` → `MOVIE_EXISTS` with `{field: "UNIQUE"}` and the
    ///   offending value.
    /// - Validation → `MALFORMED_REQUEST` with one `field: CODE` entry per
    ///   failing field.
    /// - Aggregate imports → `MALFORMED_REQUEST` with the failure list.
    /// - Everything else is logged and reported as `INTERNAL_SERVER_ERROR`.
    pub fn describe(&self) -> ErrorDescription {
        match self {
            CatalogError::Core(core) => describe_core(core),
            CatalogError::AggregateImport(summary) => {
                let mut description = ErrorDescription::new(FailureCode::MalformedRequest);
                description.failures = summary.failures.clone();
                description
            }
            other => {
                tracing::error!(error = %other, "Unhandled catalog error");
                ErrorDescription::new(FailureCode::InternalServerError)
            }
        }
    }
}

fn describe_core(err: &CoreError) -> ErrorDescription {
    let mut description = ErrorDescription::new(err.code());
    match err {
        CoreError::NotFound { id, .. } => {
            description.fields.insert("id".into(), Value::from(*id));
        }
        CoreError::Conflict { field, value } => {
            description.fields.insert((*field).into(), Value::from("UNIQUE"));
            description.values.insert((*field).into(), Value::from(value.as_str()));
        }
        CoreError::Validation(failures) => {
            // One code per field; the first failure wins.
            for failure in failures {
                if !description.fields.contains_key(&failure.field) {
                    description
                        .fields
                        .insert(failure.field.clone(), Value::from(failure.code.as_str()));
                    if let Some(value) = &failure.value {
                        description.values.insert(failure.field.clone(), value.clone());
                    }
                }
            }
        }
        CoreError::Internal(msg) => {
            tracing::error!(error = %msg, "Internal core error");
        }
    }
    description
}
