//! Problem Records and Save Payloads
//!
//! A problem is keyed by a human-chosen slug that never changes after
//! creation. Examples and hints are ordered string sequences; every other
//! rich-text field holds Markdown.

use crate::models::tag::Tag;
use crate::models::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Problem difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(ValidationError::InvalidDifficulty(other.to_string())),
        }
    }
}

/// Encoding of the rich-text fields of a stored problem
///
/// Rows written by this crate are always `Markdown`. Rows without a tag
/// predate the column and have to be sniffed once on load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContentFormat {
    Markdown,
    DocumentJson,
}

impl ContentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentFormat::Markdown => "markdown",
            ContentFormat::DocumentJson => "document-json",
        }
    }

    /// Parse a stored column value; unknown values are treated as untagged
    pub fn from_column(value: Option<&str>) -> Option<Self> {
        match value {
            Some("markdown") => Some(ContentFormat::Markdown),
            Some("document-json") => Some(ContentFormat::DocumentJson),
            _ => None,
        }
    }
}

/// A stored problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemRecord {
    /// Slug, immutable primary key
    pub id: String,
    pub title: String,
    pub description: String,
    pub examples: Vec<String>,
    pub requirements: String,
    pub theory: String,
    pub hints: Vec<String>,
    pub constraints: String,
    pub difficulty: Difficulty,
    pub runner_template: String,
    /// `None` for legacy rows whose format was never recorded
    pub content_format: Option<ContentFormat>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A problem together with its resolved tags
///
/// Association rows pointing at deleted tags are not resolved and do not
/// appear in `tags`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemView {
    #[serde(flatten)]
    pub problem: ProblemRecord,
    pub tags: Vec<Tag>,
}

impl ProblemView {
    pub fn tag_ids(&self) -> Vec<String> {
        self.tags.iter().map(|t| t.id.clone()).collect()
    }
}

/// Body of a problem save request
///
/// Every field is optional at this level so that missing values surface as
/// validation errors rather than decode failures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProblemPayload {
    pub slug: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub examples: Option<Vec<String>>,
    pub requirements: Option<String>,
    pub theory: Option<String>,
    pub hints: Option<Vec<String>>,
    pub constraints: Option<String>,
    pub difficulty: Option<String>,
    pub tag_ids: Option<Vec<String>>,
    pub runner_template: Option<String>,
}

/// A validated payload with defaults applied, ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProblemWrite {
    pub id: String,
    pub title: String,
    pub description: String,
    pub examples: Vec<String>,
    pub requirements: String,
    pub theory: String,
    pub hints: Vec<String>,
    pub constraints: String,
    pub difficulty: Difficulty,
    pub runner_template: String,
    /// Submitted tag ids, deduplicated, submission order kept
    pub tag_ids: Vec<String>,
}

fn required(value: Option<String>, field: &str) -> Result<String, ValidationError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ValidationError::MissingField(field.to_string())),
    }
}

impl ProblemPayload {
    /// Check required fields and apply defaults to everything omitted
    ///
    /// # Errors
    ///
    /// - `MissingField("slug")` / `MissingField("title")` when absent or blank
    /// - `InvalidDifficulty` for anything other than easy/medium/hard
    pub fn validate(self) -> Result<ProblemWrite, ValidationError> {
        let id = required(self.slug, "slug")?;
        let title = required(self.title, "title")?;

        let difficulty = match self.difficulty.as_deref() {
            None | Some("") => Difficulty::default(),
            Some(value) => value.parse()?,
        };

        let mut tag_ids: Vec<String> = Vec::new();
        for tag_id in self.tag_ids.unwrap_or_default() {
            if !tag_ids.contains(&tag_id) {
                tag_ids.push(tag_id);
            }
        }

        Ok(ProblemWrite {
            id,
            title,
            description: self.description.unwrap_or_default(),
            examples: self.examples.unwrap_or_default(),
            requirements: self.requirements.unwrap_or_default(),
            theory: self.theory.unwrap_or_default(),
            hints: self.hints.unwrap_or_default(),
            constraints: self.constraints.unwrap_or_default(),
            difficulty,
            runner_template: self.runner_template.unwrap_or_default(),
            tag_ids,
        })
    }
}
