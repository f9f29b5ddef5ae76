//! Tag Service - Tag CRUD
//!
//! Tag names are trimmed and must be unique (exact, case-sensitive match).
//! Uniqueness is checked before writing; the UNIQUE index on `tags.name`
//! catches a concurrent writer that slipped past the check, and both cases
//! surface as `Conflict`.
//!
//! The tag list is served from a [`TagListCache`] that every successful
//! write invalidates.

use crate::db::{timestamp_now, ProblemStore};
use crate::models::{normalize_tag_name, Tag};
use crate::services::error::ServiceError;
use crate::services::tag_cache::TagListCache;
use std::sync::Arc;
use uuid::Uuid;

pub struct TagService {
    store: Arc<dyn ProblemStore>,
    cache: TagListCache,
}

impl TagService {
    pub fn new(store: Arc<dyn ProblemStore>) -> Self {
        Self {
            store,
            cache: TagListCache::new(),
        }
    }

    /// All tags, newest first
    pub async fn list_tags(&self) -> Result<Vec<Tag>, ServiceError> {
        if let Some(tags) = self.cache.get().await {
            return Ok(tags);
        }

        let generation = self.cache.generation().await;
        let tags = self.store.list_tags().await?;
        if !self.cache.store(generation, tags.clone()).await {
            tracing::debug!("Tag list changed during read, not caching");
        }
        Ok(tags)
    }

    /// Create a tag with a fresh UUID
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` when the name is missing or blank after trimming
    /// - `Conflict` when a tag with the trimmed name exists
    pub async fn create_tag(&self, name: Option<&str>) -> Result<Tag, ServiceError> {
        let name = normalize_tag_name(name)?;

        if self.store.find_tag_by_name(&name).await?.is_some() {
            return Err(ServiceError::duplicate_tag_name(&name));
        }

        let now = timestamp_now();
        let tag = Tag {
            id: Uuid::new_v4().to_string(),
            name,
            created_at: now,
            updated_at: now,
        };

        self.store.insert_tag(&tag).await.map_err(|e| {
            if e.is_unique_violation() {
                ServiceError::duplicate_tag_name(&tag.name)
            } else {
                e.into()
            }
        })?;
        self.cache.invalidate().await;

        tracing::info!("Created tag '{}' ({})", tag.name, tag.id);
        Ok(tag)
    }

    /// Rename a tag
    ///
    /// Renaming a tag to its current name succeeds.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` for a blank name
    /// - `NotFound` for an unknown id, checked before the name
    /// - `Conflict` when a different tag holds the name
    pub async fn rename_tag(&self, id: &str, name: Option<&str>) -> Result<Tag, ServiceError> {
        let name = normalize_tag_name(name)?;

        if self.store.get_tag(id).await?.is_none() {
            return Err(ServiceError::tag_not_found(id));
        }

        if let Some(existing) = self.store.find_tag_by_name(&name).await? {
            if existing.id != id {
                return Err(ServiceError::duplicate_tag_name(&name));
            }
        }

        let renamed = self
            .store
            .rename_tag(id, &name, timestamp_now())
            .await
            .map_err(|e| {
                if e.is_unique_violation() {
                    ServiceError::duplicate_tag_name(&name)
                } else {
                    e.into()
                }
            })?
            .ok_or_else(|| ServiceError::tag_not_found(id))?;
        self.cache.invalidate().await;

        tracing::info!("Renamed tag {} to '{}'", id, renamed.name);
        Ok(renamed)
    }

    /// Delete a tag
    ///
    /// Problems that referenced the tag keep their association rows; those
    /// rows no longer resolve to a tag.
    pub async fn delete_tag(&self, id: &str) -> Result<(), ServiceError> {
        if !self.store.delete_tag(id).await? {
            return Err(ServiceError::tag_not_found(id));
        }
        self.cache.invalidate().await;

        tracing::info!("Deleted tag {}", id);
        Ok(())
    }
}
