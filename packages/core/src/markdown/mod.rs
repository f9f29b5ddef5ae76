//! Document/Markdown Conversion
//!
//! The editor edits a [`Document`](crate::models::Document); problem fields
//! store Markdown. This module converts between the two:
//!
//! - [`serialize`] - Document → Markdown
//! - [`deserialize`] - Markdown → Document, best effort for anything the
//!   editor cannot represent
//! - [`LoadedField`] - the once-per-load decision between legacy document
//!   JSON and Markdown
//!
//! For documents built from the supported blocks (paragraphs, headings 1-3,
//! lists, code blocks, blockquotes) and marks (bold, italic, code),
//! `deserialize(&serialize(&doc))` reproduces the document, up to the
//! whitespace at the edges of bold and italic runs, which moves outside the
//! delimiters. Text that would read as Markdown syntax is backslash-escaped.

mod deserializer;
mod format;
mod serializer;

pub use deserializer::deserialize;
pub use format::{sniff_format, LoadedField};
pub use serializer::serialize;
