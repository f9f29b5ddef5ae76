//! Service Layer Error Types
//!
//! Every service operation fails with a [`ServiceError`]. The variants line
//! up with how callers react: fix the input, pick another name, look for a
//! different record, or give up on a storage failure.

use crate::db::DatabaseError;
use crate::models::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    /// Input rejected before anything was written
    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    /// A uniqueness rule would be broken
    #[error("{0}")]
    Conflict(String),

    /// The addressed record does not exist
    #[error("{resource} not found: {id}")]
    NotFound { resource: &'static str, id: String },

    /// Storage failed; not retried
    #[error("Database operation failed: {0}")]
    Database(#[from] DatabaseError),
}

impl ServiceError {
    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn problem_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "Problem",
            id: id.into(),
        }
    }

    pub fn tag_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "Tag",
            id: id.into(),
        }
    }

    /// Conflict message for a tag name that is already taken
    pub fn duplicate_tag_name(name: &str) -> Self {
        Self::Conflict(format!("Tag with name '{}' already exists", name))
    }
}
