//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods.
//! Pool-level methods are atomic per call; `*_in` variants run on a
//! caller-provided connection, transaction or savepoint.

pub mod actor_repo;
pub mod movie_repo;

pub use actor_repo::ActorRepo;
pub use movie_repo::MovieRepo;
