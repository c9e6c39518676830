//! Domain types and pure logic for the movie catalog.
//!
//! Nothing in this crate touches the database or performs async I/O; the
//! repository layer lives in `reelvault-db` and the orchestration in
//! `reelvault-catalog`.

pub mod error;
pub mod import;
pub mod movie;
pub mod query;
pub mod types;
pub mod validation;
