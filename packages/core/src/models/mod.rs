//! Data Models
//!
//! This module contains the data structures used throughout the problem admin:
//!
//! - `ProblemRecord` / `ProblemView` - stored problems and their resolved tags
//! - `ProblemPayload` - save request body, validated into a `ProblemWrite`
//! - `Tag` - uniquely named labels attached to problems
//! - `Document` - the editor's block tree, converted to Markdown for storage
//! - `ProblemDraft` - a problem loaded for editing

mod document;
mod problem;
mod problem_draft;
mod tag;

use thiserror::Error;

pub use document::{Block, BlockKind, Document, Element, TextRun};
pub use problem::{
    ContentFormat, Difficulty, ProblemPayload, ProblemRecord, ProblemView, ProblemWrite,
};
pub use problem_draft::ProblemDraft;
pub use tag::{normalize_tag_name, Tag, TagPayload};

/// Input validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid difficulty '{0}': expected easy, medium or hard")]
    InvalidDifficulty(String),
}
