//! Problem Admin Core
//!
//! Storage and business logic for authoring programming-problem statements,
//! plus the converter between the editor's block document and Markdown.
//!
//! # Architecture
//!
//! - **Markdown at rest**: rich-text fields are stored as Markdown with LaTeX
//!   math kept verbatim; legacy document-JSON rows are upgraded on next save
//! - **Upsert by slug**: a problem is created or fully overwritten, and its
//!   tag set reconciled, in one transaction
//! - **libsql/Turso**: embedded SQLite-compatible database
//!
//! # Modules
//!
//! - [`models`] - Data structures (ProblemRecord, Tag, Document, ...)
//! - [`markdown`] - Document ↔ Markdown conversion
//! - [`db`] - Database layer with libsql integration
//! - [`services`] - ProblemService and TagService

pub mod db;
pub mod markdown;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use models::*;
pub use services::*;
