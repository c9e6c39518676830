//! Actor entity model.

use reelvault_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// An actor row from the `actors` table. Owned by exactly one movie.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Actor {
    pub id: DbId,
    pub name: String,
    pub movie_id: DbId,
    pub created_at: Timestamp,
}
