//! Narrow read port onto the project registry.
//!
//! The task engine needs exactly two things from the registry: a project
//! summary for the tolerant list join, and the collaborator emails for
//! bulk sharing. This port keeps that dependency explicit and thin.

use crate::identity::EmailAddress;
use crate::project::domain::{ProjectId, ProjectStatus};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Minimal project view joined onto task listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectSummary {
    /// Project identifier.
    pub id: ProjectId,
    /// Project name.
    pub name: String,
    /// Release status.
    pub status: ProjectStatus,
}

/// Errors returned by directory implementations.
#[derive(Debug, Clone, Error)]
pub enum DirectoryError {
    /// The backing registry could not be read.
    #[error("project directory unavailable: {0}")]
    Unavailable(Arc<dyn std::error::Error + Send + Sync>),
}

impl DirectoryError {
    /// Wraps a lookup error.
    pub fn unavailable(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Unavailable(Arc::new(err))
    }
}

/// Read-only registry view consumed by the task engine.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    /// Returns a summary of the project, or `None` when it is missing or
    /// deleted — a dangling task reference is tolerated, not an error.
    async fn project_summary(
        &self,
        id: ProjectId,
    ) -> Result<Option<ProjectSummary>, DirectoryError>;

    /// Returns the emails of all collaborators on the project. Membership
    /// rows survive project deletion, so this works on dangling references
    /// too.
    async fn collaborator_emails(
        &self,
        id: ProjectId,
    ) -> Result<Vec<EmailAddress>, DirectoryError>;
}
