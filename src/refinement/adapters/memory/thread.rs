//! In-memory refinement repository for tests and reference use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::refinement::{
    domain::{Refinement, RefinementId},
    ports::{RefinementRepository, RefinementRepositoryError, RefinementRepositoryResult},
};
use crate::task::domain::TaskId;

/// Thread-safe in-memory refinement repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRefinementRepository {
    state: Arc<RwLock<HashMap<RefinementId, Refinement>>>,
}

impl InMemoryRefinementRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> RefinementRepositoryError {
    RefinementRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl RefinementRepository for InMemoryRefinementRepository {
    async fn insert(&self, refinement: &Refinement) -> RefinementRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.contains_key(&refinement.id()) {
            return Err(RefinementRepositoryError::DuplicateRefinement(
                refinement.id(),
            ));
        }
        state.insert(refinement.id(), refinement.clone());
        Ok(())
    }

    async fn find(&self, id: RefinementId) -> RefinementRepositoryResult<Option<Refinement>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.get(&id).cloned())
    }

    async fn list_for_task(
        &self,
        task_id: TaskId,
    ) -> RefinementRepositoryResult<Vec<Refinement>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut entries: Vec<Refinement> = state
            .values()
            .filter(|entry| entry.task_id() == task_id)
            .cloned()
            .collect();
        entries.sort_by_key(Refinement::created_at);
        Ok(entries)
    }
}
