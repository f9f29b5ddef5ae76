//! ProblemStore Trait - Storage Abstraction
//!
//! Services talk to storage through [`ProblemStore`] so the persistence
//! backend stays swappable (and stubbable in tests). [`TursoStore`] is the
//! libsql implementation.
//!
//! Every method runs on its own connection. Writes that touch more than one
//! row run inside a single `BEGIN IMMEDIATE` transaction.
//!
//! # Examples
//!
//! ```rust,no_run
//! use problem_admin_core::db::{DatabaseService, ProblemStore, TursoStore};
//! use std::path::PathBuf;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Arc::new(DatabaseService::new(PathBuf::from("./data/problems.db")).await?);
//!     let store: Arc<dyn ProblemStore> = Arc::new(TursoStore::new(db));
//!
//!     let problem = store.get_problem("two-sum").await?;
//!     Ok(())
//! }
//! ```
//!
//! [`TursoStore`]: crate::db::TursoStore

use crate::db::DatabaseError;
use crate::models::{ProblemView, ProblemWrite, Tag};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Result of a problem save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveOutcome {
    /// `true` when the save inserted a new problem, `false` for an update
    pub created: bool,
    /// The problem as stored after the save, with its tags
    pub view: ProblemView,
}

/// Persistence operations for problems, tags and their associations
///
/// Implementations must be `Send + Sync`; services hold them behind an
/// `Arc<dyn ProblemStore>`.
#[async_trait]
pub trait ProblemStore: Send + Sync {
    /// Fetch a problem and its resolved tags
    ///
    /// Association rows whose tag no longer exists are skipped.
    async fn get_problem(&self, id: &str) -> Result<Option<ProblemView>, DatabaseError>;

    /// Insert or update a problem and reconcile its tag set
    ///
    /// Runs as one transaction: existence check, insert or update of every
    /// mutable column, then the tag diff. Afterwards the problem's association
    /// set equals `write.tag_ids`.
    async fn save_problem(&self, write: &ProblemWrite) -> Result<SaveOutcome, DatabaseError>;

    /// Replace a problem's tag set
    ///
    /// Returns `false` (and writes nothing) when the problem does not exist.
    async fn set_problem_tags(
        &self,
        problem_id: &str,
        tag_ids: &[String],
    ) -> Result<bool, DatabaseError>;

    /// All tags, newest first
    async fn list_tags(&self) -> Result<Vec<Tag>, DatabaseError>;

    async fn get_tag(&self, id: &str) -> Result<Option<Tag>, DatabaseError>;

    /// Exact, case-sensitive name lookup
    async fn find_tag_by_name(&self, name: &str) -> Result<Option<Tag>, DatabaseError>;

    /// Insert a tag
    ///
    /// Fails with `DatabaseError::UniqueViolation` when the name is taken.
    async fn insert_tag(&self, tag: &Tag) -> Result<(), DatabaseError>;

    /// Rename a tag, `None` when no tag has this id
    async fn rename_tag(
        &self,
        id: &str,
        name: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<Tag>, DatabaseError>;

    /// Delete a tag, `false` when no tag has this id
    ///
    /// Association rows pointing at the tag are left in place.
    async fn delete_tag(&self, id: &str) -> Result<bool, DatabaseError>;
}
