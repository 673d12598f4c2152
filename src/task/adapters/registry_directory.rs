//! Registry-backed implementation of the task engine's project directory.

use async_trait::async_trait;
use std::sync::Arc;

use crate::identity::EmailAddress;
use crate::project::{
    domain::{Collaborator, ProjectId},
    ports::{CollaboratorRepository, ProjectRepository},
};
use crate::task::ports::{DirectoryError, ProjectDirectory, ProjectSummary};

/// Adapter exposing registry data to the task engine through the
/// [`ProjectDirectory`] port.
#[derive(Debug, Clone)]
pub struct RegistryProjectDirectory<R>
where
    R: ProjectRepository + CollaboratorRepository,
{
    registry: Arc<R>,
}

impl<R> RegistryProjectDirectory<R>
where
    R: ProjectRepository + CollaboratorRepository,
{
    /// Creates a directory over the given registry repository.
    #[must_use]
    pub const fn new(registry: Arc<R>) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl<R> ProjectDirectory for RegistryProjectDirectory<R>
where
    R: ProjectRepository + CollaboratorRepository,
{
    async fn project_summary(
        &self,
        id: ProjectId,
    ) -> Result<Option<ProjectSummary>, DirectoryError> {
        let project = self
            .registry
            .find_project(id)
            .await
            .map_err(DirectoryError::unavailable)?;
        Ok(project.map(|project| ProjectSummary {
            id: project.id(),
            name: project.name().to_owned(),
            status: project.status(),
        }))
    }

    async fn collaborator_emails(
        &self,
        id: ProjectId,
    ) -> Result<Vec<EmailAddress>, DirectoryError> {
        let collaborators = self
            .registry
            .list_collaborators(id)
            .await
            .map_err(DirectoryError::unavailable)?;
        Ok(collaborators
            .iter()
            .map(Collaborator::email)
            .cloned()
            .collect())
    }
}
