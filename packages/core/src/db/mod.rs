//! Database Layer
//!
//! Storage for problems and tags on an embedded libsql (SQLite-compatible)
//! database file:
//!
//! - [`DatabaseService`] - opening the file, schema creation, connections
//! - [`ProblemStore`] - the storage abstraction the services depend on
//! - [`TursoStore`] - its libsql implementation

mod database;
mod error;
mod problem_store;
mod turso_store;

pub use database::DatabaseService;
pub use error::DatabaseError;
pub use problem_store::{ProblemStore, SaveOutcome};
pub use turso_store::{timestamp_now, TursoStore};
