//! Movie catalog services: batch import of the plain-text feed, catalog
//! queries, and the service facade the outer API calls.

pub mod config;
pub mod error;
pub mod importer;
pub mod query_engine;
pub mod response;
pub mod service;

pub use error::{CatalogError, CatalogResult};
pub use service::CatalogService;
