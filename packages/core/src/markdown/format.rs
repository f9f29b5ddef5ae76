//! Stored Content Format Decision
//!
//! Problem fields hold Markdown. Older rows may instead hold the editor's
//! document JSON, and those rows carry no format tag. The decision of how to
//! read a field is taken exactly once, when the field is loaded, and is then
//! fixed for the life of the [`LoadedField`]: editing replaces the document,
//! never the format.

use crate::markdown::{deserialize, serialize};
use crate::models::{Block, ContentFormat, Document};

/// Guess the format of an untagged stored value
///
/// A value that decodes as an array of document blocks is legacy document
/// JSON. Anything else, including JSON that is not a block array, is
/// Markdown.
pub fn sniff_format(raw: &str) -> ContentFormat {
    match serde_json::from_str::<Vec<Block>>(raw) {
        Ok(_) => ContentFormat::DocumentJson,
        Err(_) => ContentFormat::Markdown,
    }
}

/// A field loaded for editing together with the format it was read as
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedField {
    format: ContentFormat,
    document: Document,
}

impl LoadedField {
    /// Load a stored value
    ///
    /// `declared` is the row's format tag. Only when it is absent is the
    /// value sniffed. An empty value loads as one empty paragraph.
    pub fn load(raw: &str, declared: Option<ContentFormat>) -> Self {
        let format = declared.unwrap_or_else(|| sniff_format(raw));

        let document = if raw.trim().is_empty() {
            Document::default()
        } else {
            match format {
                ContentFormat::Markdown => deserialize(raw),
                ContentFormat::DocumentJson => match serde_json::from_str::<Document>(raw) {
                    Ok(document) => document,
                    Err(e) => {
                        tracing::warn!(
                            "Field tagged as document JSON failed to decode, loading as Markdown: {}",
                            e
                        );
                        deserialize(raw)
                    }
                },
            }
        };

        let document = if document.is_empty() {
            Document::empty_paragraph()
        } else {
            document
        };

        Self { format, document }
    }

    /// Format the value was read as; fixed at load
    pub fn format(&self) -> ContentFormat {
        self.format
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Replace the edited document
    pub fn set_document(&mut self, document: Document) {
        self.document = document;
    }

    /// Markdown for storage, whatever the field was loaded from
    pub fn to_markdown(&self) -> String {
        serialize(&self.document)
    }
}
