//! Movie catalog domain types.
//!
//! Two families of types live here:
//!
//! - Request DTOs (`CreateMovie`, `UpdateMovie`) as they arrive from callers
//!   or from the import mapper. These are unvalidated.
//! - Validated forms (`NewMovie`, `MoviePatch`) which can only be produced by
//!   [`crate::validation`]. The repository layer accepts nothing else.

use serde::{Deserialize, Serialize};

/// Earliest release year accepted into the catalog (inclusive).
pub const YEAR_MIN: i32 = 1900;

/// Latest release year accepted into the catalog (inclusive).
pub const YEAR_MAX: i32 = 2100;

// ---------------------------------------------------------------------------
// Format
// ---------------------------------------------------------------------------

/// Physical media format. The string forms are exact and case-sensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovieFormat {
    #[serde(rename = "VHS")]
    Vhs,
    #[serde(rename = "DVD")]
    Dvd,
    #[serde(rename = "Blu-ray")]
    BluRay,
}

impl MovieFormat {
    pub const ALL: [MovieFormat; 3] = [MovieFormat::Vhs, MovieFormat::Dvd, MovieFormat::BluRay];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vhs => "VHS",
            Self::Dvd => "DVD",
            Self::BluRay => "Blu-ray",
        }
    }

    /// Exact match against the canonical string forms.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == value)
    }
}

impl std::fmt::Display for MovieFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Request DTOs
// ---------------------------------------------------------------------------

/// Unvalidated request to create an actor as part of a movie's cast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateActor {
    pub name: String,
}

/// Unvalidated request to create a movie.
///
/// `year` is a float so that a non-numeric import value can be carried as
/// `NaN` until validation rejects it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMovie {
    pub title: String,
    pub year: f64,
    pub format: String,
    #[serde(default)]
    pub actors: Option<Vec<CreateActor>>,
}

/// Unvalidated partial update. `actors: Some(..)` replaces the whole cast.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateMovie {
    pub title: Option<String>,
    pub year: Option<f64>,
    pub format: Option<String>,
    pub actors: Option<Vec<CreateActor>>,
}

// ---------------------------------------------------------------------------
// Validated forms
// ---------------------------------------------------------------------------

/// A movie that has passed validation and may be persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMovie {
    pub title: String,
    pub year: i32,
    pub format: MovieFormat,
    pub actors: Vec<String>,
}

/// A validated partial update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviePatch {
    pub title: Option<String>,
    pub year: Option<i32>,
    pub format: Option<MovieFormat>,
    pub actors: Option<Vec<String>>,
}

impl NewMovie {
    pub(crate) fn new(title: String, year: i32, format: MovieFormat, actors: Vec<String>) -> Self {
        Self {
            title,
            year,
            format,
            actors,
        }
    }
}
