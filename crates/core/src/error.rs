use serde::{Deserialize, Serialize};

use crate::types::DbId;
use crate::validation::FieldFailure;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: DbId },

    #[error("Validation failed: {}", summarize(.0))]
    Validation(Vec<FieldFailure>),

    #[error("Conflict: {field} '{value}' already exists")]
    Conflict { field: &'static str, value: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// The failure code this error surfaces as at the outer API boundary.
    pub fn code(&self) -> FailureCode {
        match self {
            CoreError::NotFound { .. } => FailureCode::MovieNotFound,
            CoreError::Validation(_) => FailureCode::MalformedRequest,
            CoreError::Conflict { .. } => FailureCode::MovieExists,
            CoreError::Internal(_) => FailureCode::InternalServerError,
        }
    }
}

fn summarize(failures: &[FieldFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{}={}", f.field, f.code))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Machine-readable failure codes shared by validation, import reports and
/// error descriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailureCode {
    #[serde(rename = "MOVIE_EXISTS")]
    MovieExists,
    #[serde(rename = "MOVIE_NOT_FOUND")]
    MovieNotFound,
    /// Year is below 1900 or not a number at all.
    #[serde(rename = "MOVIE_YEAR_BIGGER_THAN_1900")]
    MovieYearBiggerThan1900,
    #[serde(rename = "MOVIE_YEAR_LESS_THAN_2100")]
    MovieYearLessThan2100,
    #[serde(rename = "FORMAT_ERROR")]
    FormatError,
    #[serde(rename = "REQUIRED")]
    Required,
    #[serde(rename = "UNKNOWN_FIELD")]
    UnknownField,
    #[serde(rename = "MALFORMED_REQUEST")]
    MalformedRequest,
    #[serde(rename = "INTERNAL_SERVER_ERROR")]
    InternalServerError,
}

impl FailureCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MovieExists => "MOVIE_EXISTS",
            Self::MovieNotFound => "MOVIE_NOT_FOUND",
            Self::MovieYearBiggerThan1900 => "MOVIE_YEAR_BIGGER_THAN_1900",
            Self::MovieYearLessThan2100 => "MOVIE_YEAR_LESS_THAN_2100",
            Self::FormatError => "FORMAT_ERROR",
            Self::Required => "REQUIRED",
            Self::UnknownField => "UNKNOWN_FIELD",
            Self::MalformedRequest => "MALFORMED_REQUEST",
            Self::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

impl std::fmt::Display for FailureCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
