//! Maps raw import labels and string values onto a [`CreateMovie`] request.

use crate::movie::{CreateActor, CreateMovie};

use super::parser::ParsedRecordBlock;

/// Separator between actor names in a `Stars` value.
pub const ACTOR_SEPARATOR: &str = ", ";

/// Internal attribute a raw import label maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CanonicalField {
    Title,
    Year,
    Format,
    Actors,
}

impl CanonicalField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Year => "year",
            Self::Format => "format",
            Self::Actors => "actors",
        }
    }
}

/// A record block that could not be turned into a creation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MalformedRecord {
    #[error("unknown field '{label}' on line {line}")]
    UnknownField { label: String, line: usize },
}

/// Resolve a raw label (case-insensitive, surrounding whitespace ignored).
pub fn canonical_field(label: &str) -> Option<CanonicalField> {
    match label.trim().to_lowercase().as_str() {
        "title" => Some(CanonicalField::Title),
        "release year" => Some(CanonicalField::Year),
        "format" => Some(CanonicalField::Format),
        "stars" => Some(CanonicalField::Actors),
        _ => None,
    }
}

/// The label the import feed uses for a canonical field name, for reporting
/// failures in the feed's own vocabulary.
pub fn import_label(field: &str) -> Option<&'static str> {
    match field {
        "title" => Some("Title"),
        "year" => Some("Release Year"),
        "format" => Some("Format"),
        "actors" => Some("Stars"),
        _ => None,
    }
}

/// Convert one record block into a creation request.
///
/// Fields absent from the block are left empty (`NaN` for the year) so
/// that validation reports them. A repeated label overwrites the earlier
/// value.
pub fn map_record(block: &ParsedRecordBlock) -> Result<CreateMovie, MalformedRecord> {
    let mut movie = CreateMovie {
        title: String::new(),
        year: f64::NAN,
        format: String::new(),
        actors: None,
    };

    for field in &block.fields {
        let canonical =
            canonical_field(&field.label).ok_or_else(|| MalformedRecord::UnknownField {
                label: field.label.clone(),
                line: field.line,
            })?;

        match canonical {
            CanonicalField::Title => movie.title = field.value.clone(),
            CanonicalField::Year => movie.year = parse_year(&field.value),
            CanonicalField::Format => movie.format = field.value.clone(),
            CanonicalField::Actors => movie.actors = Some(split_actors(&field.value)),
        }
    }

    Ok(movie)
}

/// Numeric coercion. Anything that is not a number becomes `NaN`, never 0.
fn parse_year(value: &str) -> f64 {
    value.trim().parse::<f64>().unwrap_or(f64::NAN)
}

fn split_actors(value: &str) -> Vec<CreateActor> {
    value
        .split(ACTOR_SEPARATOR)
        .map(|name| CreateActor {
            name: name.to_string(),
        })
        .collect()
}
