//! Service layer for project registry, membership, and invitations.

use crate::identity::{EmailAddress, Identity, IdentityError};
use crate::project::{
    domain::{
        Collaborator, CollaboratorId, CollaboratorRole, Invitation, InvitationError,
        InvitationStatus, Project, ProjectDomainError, ProjectId, ProjectRole, ProjectSeed,
        ProjectUpdate,
    },
    ports::{
        CollaboratorRepository, InvitationNotice, InvitationNotifier, InvitationRepository,
        MetricsError, MetricsProvider, ProjectRepository, RegistryRepositoryError,
    },
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Project annotated with the caller's relationship to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectListing {
    /// The project record.
    pub project: Project,
    /// The caller's role on the project.
    pub role: ProjectRole,
}

/// Service-level errors for registry operations.
#[derive(Debug, Error)]
pub enum RegistryServiceError {
    /// No identity context was supplied for a mutation.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The identity lacks the email address the operation requires.
    #[error("an email address is required for this operation")]
    EmailRequired,

    /// The referenced project does not exist.
    #[error("project not found: {0}")]
    ProjectNotFound(ProjectId),

    /// No invitation matches the presented token.
    #[error("invitation not found")]
    InvitationNotFound,

    /// The referenced collaborator row does not exist on the project.
    #[error("collaborator not found: {0}")]
    CollaboratorNotFound(CollaboratorId),

    /// The identity lacks the required relationship to the project.
    #[error("not authorized")]
    NotAuthorized,

    /// The invited email already has a membership row on the project.
    #[error("{0} is already a collaborator on this project")]
    AlreadyMember(EmailAddress),

    /// The project owner cannot be removed from their own project.
    #[error("the project owner cannot be removed")]
    CannotRemoveOwner,

    /// Invitation response failed with a terminal condition.
    #[error(transparent)]
    Invitation(#[from] InvitationError),

    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] ProjectDomainError),

    /// Identity value validation failed.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] RegistryRepositoryError),

    /// Metrics fetch failed.
    #[error(transparent)]
    Metrics(#[from] MetricsError),
}

/// Result type for registry service operations.
pub type RegistryServiceResult<T> = Result<T, RegistryServiceError>;

/// Registry orchestration service.
///
/// Owns the project/collaborator/invitation workflows and resolves the
/// owner-or-collaborator authorization matrix in one place.
#[derive(Clone)]
pub struct ProjectRegistryService<R, C, N, M>
where
    R: ProjectRepository + CollaboratorRepository + InvitationRepository,
    C: Clock + Send + Sync,
    N: InvitationNotifier,
    M: MetricsProvider,
{
    repository: Arc<R>,
    clock: Arc<C>,
    notifier: Arc<N>,
    metrics: Arc<M>,
}

impl<R, C, N, M> ProjectRegistryService<R, C, N, M>
where
    R: ProjectRepository + CollaboratorRepository + InvitationRepository,
    C: Clock + Send + Sync,
    N: InvitationNotifier,
    M: MetricsProvider,
{
    /// Creates a new registry service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>, notifier: Arc<N>, metrics: Arc<M>) -> Self {
        Self {
            repository,
            clock,
            notifier,
            metrics,
        }
    }

    /// Returns the caller's projects: owned ones plus accepted memberships,
    /// each annotated with the caller's role. Ownership wins when both
    /// relationships exist. An unauthenticated caller gets an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn list_projects(
        &self,
        identity: Option<&Identity>,
    ) -> RegistryServiceResult<Vec<ProjectListing>> {
        let Some(identity) = identity else {
            return Ok(Vec::new());
        };

        let owned = self
            .repository
            .list_projects_owned_by(identity.subject())
            .await?;
        let mut listings: Vec<ProjectListing> = owned
            .into_iter()
            .map(|project| ProjectListing {
                project,
                role: ProjectRole::Owner,
            })
            .collect();

        let memberships = self.repository.list_memberships(identity.subject()).await?;
        for membership in memberships {
            if listings
                .iter()
                .any(|listing| listing.project.id() == membership.project_id())
            {
                continue;
            }
            // Dangling membership rows for deleted projects are tolerated.
            let Some(project) = self.repository.find_project(membership.project_id()).await?
            else {
                continue;
            };
            listings.push(ProjectListing {
                project,
                role: ProjectRole::Collaborator(membership.role()),
            });
        }

        Ok(listings)
    }

    /// Returns a single project with the caller's role.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotAuthenticated`] without identity,
    /// [`RegistryServiceError::ProjectNotFound`] when absent, and
    /// [`RegistryServiceError::NotAuthorized`] when the caller is neither
    /// owner nor collaborator.
    pub async fn get_project(
        &self,
        identity: Option<&Identity>,
        project_id: ProjectId,
    ) -> RegistryServiceResult<ProjectListing> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let project = self.find_project_or_error(project_id).await?;
        let role = self
            .resolve_access(&project, identity)
            .await?
            .ok_or(RegistryServiceError::NotAuthorized)?;
        Ok(ProjectListing { project, role })
    }

    /// Creates a project owned by the caller and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotAuthenticated`] without identity
    /// or [`RegistryServiceError::Repository`] when persistence fails.
    pub async fn create_project(
        &self,
        identity: Option<&Identity>,
        seed: ProjectSeed,
    ) -> RegistryServiceResult<ProjectId> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let project = Project::new(identity.subject().clone(), seed, &*self.clock);
        self.repository.insert_project(&project).await?;
        Ok(project.id())
    }

    /// Applies a partial update to an owned project.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotAuthorized`] for non-owners in
    /// addition to the usual identity and lookup failures.
    pub async fn update_project(
        &self,
        identity: Option<&Identity>,
        project_id: ProjectId,
        update: ProjectUpdate,
    ) -> RegistryServiceResult<Project> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let mut project = self.find_project_or_error(project_id).await?;
        self.require_owner(&project, identity)?;
        project.apply_update(update, &*self.clock);
        self.repository.update_project(&project).await?;
        Ok(project)
    }

    /// Hard-deletes an owned project. Tasks, collaborators, and invitations
    /// referencing it are left dangling by design; readers treat the
    /// reference as "project missing".
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotAuthorized`] for non-owners in
    /// addition to the usual identity and lookup failures.
    pub async fn delete_project(
        &self,
        identity: Option<&Identity>,
        project_id: ProjectId,
    ) -> RegistryServiceResult<()> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let project = self.find_project_or_error(project_id).await?;
        self.require_owner(&project, identity)?;
        self.repository.delete_project(project_id).await?;
        Ok(())
    }

    /// Invites an email address to collaborate on an owned project.
    ///
    /// Phase one transactionally upserts the invitation keyed by
    /// `(project, email)` — re-inviting refreshes the existing row with a
    /// fresh token and validity window instead of duplicating it. Phase two
    /// dispatches a best-effort notification whose failure is logged and
    /// never rolls back phase one.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::AlreadyMember`] when the email
    /// already holds a membership row, in addition to the usual identity,
    /// lookup, and authorization failures.
    pub async fn invite_collaborator(
        &self,
        identity: Option<&Identity>,
        project_id: ProjectId,
        email: &str,
        role: CollaboratorRole,
    ) -> RegistryServiceResult<Invitation> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let project = self.find_project_or_error(project_id).await?;
        self.require_owner(&project, identity)?;

        let invitee = EmailAddress::parse(email)?;
        if self
            .repository
            .find_membership_by_email(project_id, &invitee)
            .await?
            .is_some()
        {
            return Err(RegistryServiceError::AlreadyMember(invitee));
        }

        let inviter_name = identity.display_label().to_owned();
        let invitation = match self
            .repository
            .find_invitation_for_email(project_id, &invitee)
            .await?
        {
            Some(mut existing) => {
                existing.refresh(
                    role,
                    identity.subject().clone(),
                    Some(inviter_name.clone()),
                    &*self.clock,
                );
                existing
            }
            None => Invitation::new(
                project_id,
                invitee.clone(),
                role,
                identity.subject().clone(),
                Some(inviter_name.clone()),
                &*self.clock,
            ),
        };
        self.repository.upsert_invitation(&invitation).await?;

        let notice = InvitationNotice {
            to: invitee,
            inviter_name,
            project_name: project.name().to_owned(),
            role,
            token: invitation.token().as_str().to_owned(),
        };
        if let Err(err) = self.notifier.invitation_created(&notice).await {
            tracing::warn!(
                project = %project_id,
                to = %notice.to,
                error = %err,
                "invitation notification failed; invitation row remains authoritative"
            );
        }

        Ok(invitation)
    }

    /// Accepts an invitation by token and returns the project identifier
    /// for client-side redirect.
    ///
    /// A pending invitation whose validity window has strictly passed is
    /// flipped to expired as part of this call before the failure is
    /// surfaced.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::InvitationNotFound`] for unknown
    /// tokens and [`RegistryServiceError::Invitation`] for terminal
    /// invitation conditions.
    pub async fn accept_invitation(
        &self,
        identity: Option<&Identity>,
        token: &str,
    ) -> RegistryServiceResult<ProjectId> {
        let (identity, email) = self.require_email(identity)?;
        let mut invitation = self
            .repository
            .find_invitation_by_token(token)
            .await?
            .ok_or(RegistryServiceError::InvitationNotFound)?;

        if let Err(err) = invitation.accept(identity.subject().clone(), &email, &*self.clock) {
            if err == InvitationError::Expired {
                // Lazy expiry is a side-effecting read: persist the flip.
                self.repository.update_invitation(&invitation).await?;
            }
            return Err(err.into());
        }

        let mut collaborator = match self
            .repository
            .find_membership(invitation.project_id(), identity.subject())
            .await?
        {
            Some(existing) => existing,
            None => Collaborator::new(
                invitation.project_id(),
                identity.subject().clone(),
                email,
                invitation.role(),
                invitation.invited_by().clone(),
                &*self.clock,
            ),
        };
        collaborator.update_profile(invitation.role(), identity.name().map(str::to_owned));
        self.repository.upsert_collaborator(&collaborator).await?;
        self.repository.update_invitation(&invitation).await?;

        Ok(invitation.project_id())
    }

    /// Declines an invitation by token.
    ///
    /// Same resolution and email-match rules as
    /// [`ProjectRegistryService::accept_invitation`], but no collaborator
    /// row is created or touched.
    ///
    /// # Errors
    ///
    /// Returns the same failures as
    /// [`ProjectRegistryService::accept_invitation`].
    pub async fn decline_invitation(
        &self,
        identity: Option<&Identity>,
        token: &str,
    ) -> RegistryServiceResult<()> {
        let (identity, email) = self.require_email(identity)?;
        let mut invitation = self
            .repository
            .find_invitation_by_token(token)
            .await?
            .ok_or(RegistryServiceError::InvitationNotFound)?;

        if let Err(err) = invitation.decline(identity.subject().clone(), &email, &*self.clock) {
            if err == InvitationError::Expired {
                self.repository.update_invitation(&invitation).await?;
            }
            return Err(err.into());
        }

        self.repository.update_invitation(&invitation).await?;
        Ok(())
    }

    /// Removes a collaborator row from an owned project.
    ///
    /// The owner can never be removed; membership rows for the owner are
    /// structurally impossible, but the guard stays as protection against
    /// schema drift.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::CollaboratorNotFound`] when the row
    /// is absent or belongs to a different project, and
    /// [`RegistryServiceError::CannotRemoveOwner`] for the defensive guard.
    pub async fn remove_collaborator(
        &self,
        identity: Option<&Identity>,
        project_id: ProjectId,
        collaborator_id: CollaboratorId,
    ) -> RegistryServiceResult<()> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let project = self.find_project_or_error(project_id).await?;
        self.require_owner(&project, identity)?;

        let collaborator = self
            .repository
            .find_collaborator(collaborator_id)
            .await?
            .filter(|row| row.project_id() == project_id)
            .ok_or(RegistryServiceError::CollaboratorNotFound(collaborator_id))?;
        if collaborator.subject() == project.owner() {
            return Err(RegistryServiceError::CannotRemoveOwner);
        }

        self.repository.remove_collaborator(collaborator_id).await?;
        Ok(())
    }

    /// Returns the collaborator rows of a project the caller can see.
    /// An unauthenticated caller gets an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::NotAuthorized`] when the caller is
    /// neither owner nor collaborator.
    pub async fn project_collaborators(
        &self,
        identity: Option<&Identity>,
        project_id: ProjectId,
    ) -> RegistryServiceResult<Vec<Collaborator>> {
        let Some(identity) = identity else {
            return Ok(Vec::new());
        };
        let project = self.find_project_or_error(project_id).await?;
        self.resolve_access(&project, identity)
            .await?
            .ok_or(RegistryServiceError::NotAuthorized)?;
        Ok(self.repository.list_collaborators(project_id).await?)
    }

    /// Returns every collaborator row across the caller's owned projects.
    /// An unauthenticated caller gets an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn all_collaborators(
        &self,
        identity: Option<&Identity>,
    ) -> RegistryServiceResult<Vec<Collaborator>> {
        let Some(identity) = identity else {
            return Ok(Vec::new());
        };
        let owned = self
            .repository
            .list_projects_owned_by(identity.subject())
            .await?;
        let mut rows = Vec::new();
        for project in owned {
            rows.extend(self.repository.list_collaborators(project.id()).await?);
        }
        Ok(rows)
    }

    /// Returns the caller's pending invitations that are still inside
    /// their validity window.
    ///
    /// This is a pure filter: invitations past their window silently drop
    /// out of the list without being flipped to expired. Only the accept
    /// path writes the expiry, so a listed invitation can still fail with
    /// `Expired` if time passes between listing and acting.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Repository`] when persistence lookup
    /// fails.
    pub async fn pending_invitations(
        &self,
        identity: Option<&Identity>,
    ) -> RegistryServiceResult<Vec<Invitation>> {
        let Some(email) = identity.and_then(Identity::email) else {
            return Ok(Vec::new());
        };
        let now = self.clock.utc();
        let invitations = self.repository.list_invitations_for_email(email).await?;
        Ok(invitations
            .into_iter()
            .filter(|invitation| {
                invitation.status() == InvitationStatus::Pending && invitation.expires_at() > now
            })
            .collect())
    }

    /// Refreshes GitHub and npm counters from the metrics provider for an
    /// owned project. Projects without a derived repository or package are
    /// left untouched for that source.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryServiceError::Metrics`] when a fetch fails, in
    /// addition to the usual identity, lookup, and authorization failures.
    pub async fn refresh_metrics(
        &self,
        identity: Option<&Identity>,
        project_id: ProjectId,
    ) -> RegistryServiceResult<Project> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let mut project = self.find_project_or_error(project_id).await?;
        self.require_owner(&project, identity)?;

        let mut changed = false;
        if let Some(repo) = project.github_repo().cloned() {
            let fetched = self.metrics.repository_metrics(&repo).await?;
            project.record_github_metrics(fetched.stars, fetched.forks, &*self.clock);
            changed = true;
        }
        if let Some(package) = project.npm_package().map(str::to_owned) {
            let fetched = self.metrics.package_metrics(&package).await?;
            project.record_npm_metrics(fetched.downloads, &*self.clock);
            changed = true;
        }
        if changed {
            self.repository.update_project(&project).await?;
        }
        Ok(project)
    }

    /// Resolves the caller's relationship to a project in one place so the
    /// authorization matrix stays consistent across handlers.
    async fn resolve_access(
        &self,
        project: &Project,
        identity: &Identity,
    ) -> RegistryServiceResult<Option<ProjectRole>> {
        if project.owner() == identity.subject() {
            return Ok(Some(ProjectRole::Owner));
        }
        let membership = self
            .repository
            .find_membership(project.id(), identity.subject())
            .await?;
        Ok(membership.map(|row| ProjectRole::Collaborator(row.role())))
    }

    fn require_owner(
        &self,
        project: &Project,
        identity: &Identity,
    ) -> RegistryServiceResult<()> {
        if project.owner() == identity.subject() {
            Ok(())
        } else {
            Err(RegistryServiceError::NotAuthorized)
        }
    }

    fn require_email<'a>(
        &self,
        identity: Option<&'a Identity>,
    ) -> RegistryServiceResult<(&'a Identity, EmailAddress)> {
        let identity = identity.ok_or(RegistryServiceError::NotAuthenticated)?;
        let email = identity
            .email()
            .cloned()
            .ok_or(RegistryServiceError::EmailRequired)?;
        Ok((identity, email))
    }

    async fn find_project_or_error(
        &self,
        project_id: ProjectId,
    ) -> RegistryServiceResult<Project> {
        self.repository
            .find_project(project_id)
            .await?
            .ok_or(RegistryServiceError::ProjectNotFound(project_id))
    }
}
