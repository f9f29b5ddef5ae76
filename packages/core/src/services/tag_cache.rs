//! Tag List Cache
//!
//! Holds the last tag list read from storage. The cache is only ever
//! invalidated explicitly: every tag write clears it, so the next list reads
//! through to storage. There is no time-based expiry.
//!
//! Each invalidation bumps a generation counter. A read-through captures the
//! generation before it queries storage and may only fill the cache if no
//! write invalidated it in the meantime, so a list that raced a write never
//! caches the pre-write result.

use crate::models::Tag;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct CacheState {
    tags: Option<Vec<Tag>>,
    generation: u64,
}

#[derive(Debug, Clone, Default)]
pub struct TagListCache {
    state: Arc<RwLock<CacheState>>,
}

impl TagListCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached list, `None` after invalidation
    pub async fn get(&self) -> Option<Vec<Tag>> {
        self.state.read().await.tags.clone()
    }

    /// Current generation; capture it before reading storage
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Fill the cache with a list read at `generation`
    ///
    /// Returns `false` and leaves the cache empty when an invalidation
    /// happened since `generation` was captured.
    pub async fn store(&self, generation: u64, tags: Vec<Tag>) -> bool {
        let mut state = self.state.write().await;
        if state.generation != generation {
            return false;
        }
        state.tags = Some(tags);
        true
    }

    pub async fn invalidate(&self) {
        let mut state = self.state.write().await;
        state.tags = None;
        state.generation = state.generation.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn tag(name: &str) -> Tag {
        let now = Utc::now();
        Tag {
            id: format!("id-{}", name),
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_store_and_invalidate() {
        let cache = TagListCache::new();
        assert!(cache.get().await.is_none());

        let generation = cache.generation().await;
        assert!(cache.store(generation, vec![tag("Arrays")]).await);
        assert_eq!(cache.get().await.map(|tags| tags.len()), Some(1));

        cache.invalidate().await;
        assert!(cache.get().await.is_none());
    }

    #[tokio::test]
    async fn test_store_after_invalidation_is_dropped() {
        let cache = TagListCache::new();

        let generation = cache.generation().await;
        cache.invalidate().await;

        assert!(!cache.store(generation, vec![tag("Arrays")]).await);
        assert!(cache.get().await.is_none());

        let generation = cache.generation().await;
        assert!(cache.store(generation, Vec::new()).await);
        assert_eq!(cache.get().await, Some(Vec::new()));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let cache = TagListCache::new();
        let other = cache.clone();

        let generation = other.generation().await;
        cache.store(generation, Vec::new()).await;
        assert_eq!(other.get().await, Some(Vec::new()));
    }
}
