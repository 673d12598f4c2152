//! Repository port for refinement thread persistence.

use crate::refinement::domain::{Refinement, RefinementId};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for refinement repository operations.
pub type RefinementRepositoryResult<T> = Result<T, RefinementRepositoryError>;

/// Refinement persistence contract.
#[async_trait]
pub trait RefinementRepository: Send + Sync {
    /// Stores a new refinement entry.
    ///
    /// # Errors
    ///
    /// Returns [`RefinementRepositoryError::DuplicateRefinement`] when the
    /// entry ID already exists.
    async fn insert(&self, refinement: &Refinement) -> RefinementRepositoryResult<()>;

    /// Finds an entry by identifier. Returns `None` when absent.
    async fn find(&self, id: RefinementId) -> RefinementRepositoryResult<Option<Refinement>>;

    /// Returns all entries for a task ordered by creation time, for
    /// client-side grouping into notes, question/answer pairs, and
    /// updates.
    async fn list_for_task(&self, task_id: TaskId) -> RefinementRepositoryResult<Vec<Refinement>>;
}

/// Errors returned by refinement repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RefinementRepositoryError {
    /// An entry with the same identifier already exists.
    #[error("duplicate refinement identifier: {0}")]
    DuplicateRefinement(RefinementId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RefinementRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
