use reelvault_core::error::{CoreError, FailureCode};
use reelvault_core::validation::FieldFailure;

/// Error returned by repository methods.
///
/// Storage-level constraint violations are translated into domain errors
/// here, so callers above the repository never inspect SQLite error codes.
#[derive(Debug, thiserror::Error)]
pub enum RepoError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Classify an error raised while writing a movie row.
///
/// - Unique violations can only come from `uq_movies_title` and become
///   [`CoreError::Conflict`] on `title`.
/// - CHECK violations become a [`CoreError::Validation`] on the column named
///   in the constraint message.
/// - Everything else passes through unchanged.
pub(crate) fn classify_write_error(err: sqlx::Error, title: &str) -> RepoError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return CoreError::Conflict {
                field: "title",
                value: title.to_string(),
            }
            .into();
        }
        if db_err.is_check_violation() {
            let field = checked_column(db_err.message());
            tracing::warn!(field, error = %db_err, "Storage rejected movie row");
            return CoreError::Validation(vec![FieldFailure {
                field: field.to_string(),
                code: FailureCode::FormatError,
                value: None,
            }])
            .into();
        }
    }
    RepoError::Database(err)
}

fn checked_column(message: &str) -> &'static str {
    ["title", "year", "format", "name"]
        .into_iter()
        .find(|column| message.contains(column))
        .map(|column| if column == "name" { "actors" } else { column })
        .unwrap_or("movie")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn checked_column_reads_constraint_message() {
        assert_eq!(
            checked_column("CHECK constraint failed: year BETWEEN 1900 AND 2100"),
            "year"
        );
        assert_eq!(checked_column("CHECK constraint failed: length(name) > 0"), "actors");
        assert_eq!(checked_column("CHECK constraint failed"), "movie");
    }
}
