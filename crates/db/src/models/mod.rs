//! Row models and DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row. Request DTOs live in `reelvault_core::movie`.

pub mod actor;
pub mod movie;
