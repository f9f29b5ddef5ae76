//! Tags
//!
//! Tags carry a display name that is unique across the tag set. Names are
//! compared exactly (case-sensitive) after trimming surrounding whitespace.

use crate::models::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of a tag create or rename request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TagPayload {
    pub name: Option<String>,
}

/// Trim a submitted tag name, rejecting it when nothing is left
pub fn normalize_tag_name(name: Option<&str>) -> Result<String, ValidationError> {
    let trimmed = name.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField("name".to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims() {
        assert_eq!(normalize_tag_name(Some(" Graphs ")).unwrap(), "Graphs");
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert!(normalize_tag_name(None).is_err());
        assert!(normalize_tag_name(Some("")).is_err());
        assert!(normalize_tag_name(Some(" \t ")).is_err());
    }

    #[test]
    fn test_case_is_preserved() {
        assert_eq!(normalize_tag_name(Some("graphs")).unwrap(), "graphs");
    }
}
