//! Narrow read port onto the task engine.
//!
//! Refinement threads need exactly one thing from the task engine: who
//! owns a task and who it is shared with, to authorize authors and
//! snapshot their role.

use crate::identity::{EmailAddress, SubjectId};
use crate::task::domain::TaskId;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Ownership and visibility view of a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskAccessView {
    /// Owner subject identifier.
    pub owner: SubjectId,
    /// Emails the task is shared with.
    pub shared_with: Vec<EmailAddress>,
}

impl TaskAccessView {
    /// Returns whether the subject owns the task.
    #[must_use]
    pub fn is_owner(&self, subject: &SubjectId) -> bool {
        &self.owner == subject
    }

    /// Returns whether the email is in the task's share set.
    #[must_use]
    pub fn is_shared_with(&self, email: &EmailAddress) -> bool {
        self.shared_with.contains(email)
    }
}

/// Errors returned by task directory implementations.
#[derive(Debug, Clone, Error)]
pub enum TaskDirectoryError {
    /// The backing task store could not be read.
    #[error("task directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl TaskDirectoryError {
    /// Wraps a lookup error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}

/// Read-only task view consumed by the refinement thread.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskDirectory: Send + Sync {
    /// Returns the access view of a task, or `None` when it does not
    /// exist.
    async fn access_view(
        &self,
        id: TaskId,
    ) -> Result<Option<TaskAccessView>, TaskDirectoryError>;
}
