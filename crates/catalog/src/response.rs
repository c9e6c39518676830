//! Response envelopes returned by [`crate::service::CatalogService`].
//!
//! Everything is wrapped in `{ "data": ... }`, with a `meta` object where
//! the operation reports counts.

use reelvault_db::models::movie::MovieWithActors;
use serde::Serialize;

/// Standard `{ "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// A page of movies. `total` counts the whole catalog, not the filtered set.
#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub data: Vec<MovieWithActors>,
    pub meta: ListMeta,
}

#[derive(Debug, Serialize)]
pub struct ListMeta {
    pub total: i64,
}

#[derive(Debug, Serialize)]
pub struct ImportResponse {
    pub data: Vec<MovieWithActors>,
    pub meta: ImportMeta,
}

#[derive(Debug, Serialize)]
pub struct ImportMeta {
    pub imported: usize,
    pub total: i64,
}
