//! Catalog validation rules: pure logic, no database access.
//!
//! Every rule violation is collected (not just the first) so that callers
//! and import reports can show all problems with a record at once.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FailureCode;
use crate::movie::{
    CreateActor, CreateMovie, MovieFormat, MoviePatch, NewMovie, UpdateMovie, YEAR_MAX, YEAR_MIN,
};

/// Letters, whitespace and hyphens only.
static ACTOR_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^[a-z\s-]+$").expect("valid regex"));

/// A single field-level rule violation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldFailure {
    pub field: String,
    pub code: FailureCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldFailure {
    fn new(field: &str, code: FailureCode, value: Value) -> Self {
        Self {
            field: field.to_string(),
            code,
            value: Some(value),
        }
    }
}

/// Validate a creation request, producing the persistable form.
pub fn validate_create(input: &CreateMovie) -> Result<NewMovie, Vec<FieldFailure>> {
    let mut failures = Vec::new();

    let title = check_title(&input.title, &mut failures);
    let year = check_year(input.year, &mut failures);
    let format = check_format(&input.format, &mut failures);
    let actors = input
        .actors
        .as_deref()
        .map(|actors| check_actors(actors, &mut failures))
        .unwrap_or_default();

    match (title, year, format) {
        (Some(title), Some(year), Some(format)) if failures.is_empty() => {
            Ok(NewMovie::new(title, year, format, actors))
        }
        _ => Err(failures),
    }
}

/// Validate a partial update. Only fields present in `input` are checked.
pub fn validate_update(input: &UpdateMovie) -> Result<MoviePatch, Vec<FieldFailure>> {
    let mut failures = Vec::new();

    let patch = MoviePatch {
        title: input
            .title
            .as_deref()
            .and_then(|t| check_title(t, &mut failures)),
        year: input.year.and_then(|y| check_year(y, &mut failures)),
        format: input
            .format
            .as_deref()
            .and_then(|f| check_format(f, &mut failures)),
        actors: input
            .actors
            .as_deref()
            .map(|actors| check_actors(actors, &mut failures)),
    };

    if failures.is_empty() {
        Ok(patch)
    } else {
        Err(failures)
    }
}

fn check_title(raw: &str, failures: &mut Vec<FieldFailure>) -> Option<String> {
    let title = raw.trim();
    if title.is_empty() {
        failures.push(FieldFailure::new("title", FailureCode::Required, Value::from(raw)));
        return None;
    }
    Some(title.to_string())
}

/// NaN never falls inside the range, so non-numeric input fails here rather
/// than being coerced to some default year.
fn check_year(year: f64, failures: &mut Vec<FieldFailure>) -> Option<i32> {
    let value = serde_json::Number::from_f64(year)
        .map(Value::Number)
        .unwrap_or(Value::Null);

    if !(f64::from(YEAR_MIN)..=f64::from(YEAR_MAX)).contains(&year) {
        let code = if year > f64::from(YEAR_MAX) {
            FailureCode::MovieYearLessThan2100
        } else {
            FailureCode::MovieYearBiggerThan1900
        };
        failures.push(FieldFailure::new("year", code, value));
        return None;
    }
    if year.fract() != 0.0 {
        failures.push(FieldFailure::new("year", FailureCode::FormatError, value));
        return None;
    }
    Some(year as i32)
}

fn check_format(raw: &str, failures: &mut Vec<FieldFailure>) -> Option<MovieFormat> {
    let format = raw.trim();
    if format.is_empty() {
        failures.push(FieldFailure::new("format", FailureCode::Required, Value::from(raw)));
        return None;
    }
    match MovieFormat::parse(format) {
        Some(f) => Some(f),
        None => {
            failures.push(FieldFailure::new("format", FailureCode::FormatError, Value::from(raw)));
            None
        }
    }
}

fn check_actors(actors: &[CreateActor], failures: &mut Vec<FieldFailure>) -> Vec<String> {
    let mut names = Vec::with_capacity(actors.len());
    for actor in actors {
        let name = actor.name.trim();
        if name.is_empty() {
            failures.push(FieldFailure::new(
                "actors",
                FailureCode::Required,
                Value::from(actor.name.as_str()),
            ));
        } else if !ACTOR_NAME_RE.is_match(name) {
            failures.push(FieldFailure::new(
                "actors",
                FailureCode::FormatError,
                Value::from(actor.name.as_str()),
            ));
        } else {
            names.push(name.to_string());
        }
    }
    names
}
