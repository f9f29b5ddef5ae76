//! Problem Service - Lookup and Upsert
//!
//! A save addresses a problem by slug. If no problem has that slug it is
//! created, otherwise every mutable field is overwritten; either way omitted
//! fields are written as their defaults (empty text, empty lists, `easy`).
//! The tag set submitted with the save replaces the stored one in the same
//! transaction.
//!
//! Storage errors are propagated as-is; nothing is retried.

use crate::db::{ProblemStore, SaveOutcome};
use crate::models::{ProblemPayload, ProblemView};
use crate::services::error::ServiceError;
use std::sync::Arc;

pub struct ProblemService {
    store: Arc<dyn ProblemStore>,
}

impl ProblemService {
    pub fn new(store: Arc<dyn ProblemStore>) -> Self {
        Self { store }
    }

    /// Fetch a problem with its resolved tags
    ///
    /// # Errors
    ///
    /// - `NotFound` when no problem has this slug
    /// - `Database` on storage failure
    pub async fn get_problem(&self, slug: &str) -> Result<ProblemView, ServiceError> {
        self.store
            .get_problem(slug)
            .await?
            .ok_or_else(|| ServiceError::problem_not_found(slug))
    }

    /// Create or update a problem and reconcile its tags
    ///
    /// Saving the same payload twice leaves storage as after the first save,
    /// apart from `updated_at`.
    ///
    /// # Errors
    ///
    /// - `ValidationFailed` when the slug or title is missing or blank, or the
    ///   difficulty is not one of easy/medium/hard. Nothing is written.
    /// - `Database` on storage failure; the transaction is rolled back.
    pub async fn save_problem(&self, payload: ProblemPayload) -> Result<SaveOutcome, ServiceError> {
        let write = payload.validate()?;

        let outcome = self.store.save_problem(&write).await?;

        tracing::info!(
            "{} problem '{}'",
            if outcome.created { "Created" } else { "Updated" },
            write.id
        );

        Ok(outcome)
    }

    /// Replace the tag set of an existing problem
    ///
    /// Duplicate ids are ignored. Returns the problem with its new tags.
    pub async fn set_problem_tags(
        &self,
        slug: &str,
        tag_ids: Vec<String>,
    ) -> Result<ProblemView, ServiceError> {
        let mut deduped: Vec<String> = Vec::with_capacity(tag_ids.len());
        for tag_id in tag_ids {
            if !deduped.contains(&tag_id) {
                deduped.push(tag_id);
            }
        }

        if !self.store.set_problem_tags(slug, &deduped).await? {
            return Err(ServiceError::problem_not_found(slug));
        }

        self.get_problem(slug).await
    }
}
