//! In-memory registry repository for tests and reference use.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::identity::{EmailAddress, SubjectId};
use crate::project::{
    domain::{Collaborator, CollaboratorId, Invitation, InvitationId, Project, ProjectId},
    ports::{
        CollaboratorRepository, InvitationRepository, ProjectRepository, RegistryRepositoryError,
        RegistryRepositoryResult,
    },
};

/// Thread-safe in-memory registry holding projects, collaborators, and
/// invitations behind one lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    state: Arc<RwLock<InMemoryRegistryState>>,
}

#[derive(Debug, Default)]
struct InMemoryRegistryState {
    projects: HashMap<ProjectId, Project>,
    collaborators: HashMap<CollaboratorId, Collaborator>,
    membership_index: HashMap<(ProjectId, SubjectId), CollaboratorId>,
    invitations: HashMap<InvitationId, Invitation>,
    invitation_index: HashMap<(ProjectId, EmailAddress), InvitationId>,
}

impl InMemoryRegistry {
    /// Creates an empty in-memory registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> RegistryRepositoryError {
    RegistryRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl ProjectRepository for InMemoryRegistry {
    async fn insert_project(&self, project: &Project) -> RegistryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.projects.contains_key(&project.id()) {
            return Err(RegistryRepositoryError::DuplicateProject(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn update_project(&self, project: &Project) -> RegistryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.projects.contains_key(&project.id()) {
            return Err(RegistryRepositoryError::ProjectNotFound(project.id()));
        }
        state.projects.insert(project.id(), project.clone());
        Ok(())
    }

    async fn find_project(&self, id: ProjectId) -> RegistryRepositoryResult<Option<Project>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.projects.get(&id).cloned())
    }

    async fn list_projects_owned_by(
        &self,
        owner: &SubjectId,
    ) -> RegistryRepositoryResult<Vec<Project>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut projects: Vec<Project> = state
            .projects
            .values()
            .filter(|project| project.owner() == owner)
            .cloned()
            .collect();
        projects.sort_by_key(Project::created_at);
        Ok(projects)
    }

    async fn delete_project(&self, id: ProjectId) -> RegistryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.projects.remove(&id).is_none() {
            return Err(RegistryRepositoryError::ProjectNotFound(id));
        }
        // No cascade: collaborator and invitation rows keep their dangling
        // project reference and readers treat it as "project missing".
        Ok(())
    }
}

#[async_trait]
impl CollaboratorRepository for InMemoryRegistry {
    async fn upsert_collaborator(
        &self,
        collaborator: &Collaborator,
    ) -> RegistryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let key = (collaborator.project_id(), collaborator.subject().clone());
        if let Some(existing_id) = state.membership_index.get(&key).copied() {
            if existing_id != collaborator.id() {
                state.collaborators.remove(&existing_id);
            }
        }
        state.membership_index.insert(key, collaborator.id());
        state
            .collaborators
            .insert(collaborator.id(), collaborator.clone());
        Ok(())
    }

    async fn find_collaborator(
        &self,
        id: CollaboratorId,
    ) -> RegistryRepositoryResult<Option<Collaborator>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.collaborators.get(&id).cloned())
    }

    async fn find_membership(
        &self,
        project_id: ProjectId,
        subject: &SubjectId,
    ) -> RegistryRepositoryResult<Option<Collaborator>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let row = state
            .membership_index
            .get(&(project_id, subject.clone()))
            .and_then(|id| state.collaborators.get(id))
            .cloned();
        Ok(row)
    }

    async fn find_membership_by_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Option<Collaborator>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let row = state
            .collaborators
            .values()
            .find(|row| row.project_id() == project_id && row.email() == email)
            .cloned();
        Ok(row)
    }

    async fn list_collaborators(
        &self,
        project_id: ProjectId,
    ) -> RegistryRepositoryResult<Vec<Collaborator>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut rows: Vec<Collaborator> = state
            .collaborators
            .values()
            .filter(|row| row.project_id() == project_id)
            .cloned()
            .collect();
        rows.sort_by_key(Collaborator::added_at);
        Ok(rows)
    }

    async fn list_memberships(
        &self,
        subject: &SubjectId,
    ) -> RegistryRepositoryResult<Vec<Collaborator>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut rows: Vec<Collaborator> = state
            .collaborators
            .values()
            .filter(|row| row.subject() == subject)
            .cloned()
            .collect();
        rows.sort_by_key(Collaborator::added_at);
        Ok(rows)
    }

    async fn remove_collaborator(&self, id: CollaboratorId) -> RegistryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let Some(row) = state.collaborators.remove(&id) else {
            return Err(RegistryRepositoryError::CollaboratorNotFound(id));
        };
        state
            .membership_index
            .remove(&(row.project_id(), row.subject().clone()));
        Ok(())
    }
}

#[async_trait]
impl InvitationRepository for InMemoryRegistry {
    async fn upsert_invitation(&self, invitation: &Invitation) -> RegistryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let key = (invitation.project_id(), invitation.email().clone());
        if let Some(existing_id) = state.invitation_index.get(&key).copied() {
            if existing_id != invitation.id() {
                state.invitations.remove(&existing_id);
            }
        }
        state.invitation_index.insert(key, invitation.id());
        state
            .invitations
            .insert(invitation.id(), invitation.clone());
        Ok(())
    }

    async fn update_invitation(&self, invitation: &Invitation) -> RegistryRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if !state.invitations.contains_key(&invitation.id()) {
            return Err(RegistryRepositoryError::InvitationNotFound(invitation.id()));
        }
        state
            .invitations
            .insert(invitation.id(), invitation.clone());
        Ok(())
    }

    async fn find_invitation_by_token(
        &self,
        token: &str,
    ) -> RegistryRepositoryResult<Option<Invitation>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let invitation = state
            .invitations
            .values()
            .find(|invitation| invitation.token().as_str() == token)
            .cloned();
        Ok(invitation)
    }

    async fn find_invitation_for_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Option<Invitation>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let invitation = state
            .invitation_index
            .get(&(project_id, email.clone()))
            .and_then(|id| state.invitations.get(id))
            .cloned();
        Ok(invitation)
    }

    async fn list_invitations_for_email(
        &self,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Vec<Invitation>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        let mut invitations: Vec<Invitation> = state
            .invitations
            .values()
            .filter(|invitation| invitation.email() == email)
            .cloned()
            .collect();
        invitations.sort_by_key(Invitation::invited_at);
        Ok(invitations)
    }
}
