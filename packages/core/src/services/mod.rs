//! Business Services
//!
//! - `ProblemService` - problem lookup, upsert and tag reconciliation
//! - `TagService` - tag CRUD with a write-invalidated list cache
//!
//! Services sit between the HTTP layer and the [`ProblemStore`]: they
//! validate input, apply defaults and turn storage outcomes into
//! [`ServiceError`]s.
//!
//! [`ProblemStore`]: crate::db::ProblemStore

pub mod error;
pub mod problem_service;
pub mod tag_cache;
pub mod tag_service;

pub use crate::db::SaveOutcome;
pub use error::ServiceError;
pub use problem_service::ProblemService;
pub use tag_cache::TagListCache;
pub use tag_service::TagService;
