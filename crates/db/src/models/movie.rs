//! Movie entity model.

use reelvault_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

use crate::models::actor::Actor;

/// A movie row from the `movies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Movie {
    pub id: DbId,
    pub title: String,
    pub year: i32,
    /// One of `VHS`, `DVD`, `Blu-ray`; enforced by a CHECK constraint.
    pub format: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A movie together with its cast.
#[derive(Debug, Clone, Serialize)]
pub struct MovieWithActors {
    #[serde(flatten)]
    pub movie: Movie,
    pub actors: Vec<Actor>,
}

impl MovieWithActors {
    pub fn actor_names(&self) -> Vec<&str> {
        self.actors.iter().map(|a| a.name.as_str()).collect()
    }
}
