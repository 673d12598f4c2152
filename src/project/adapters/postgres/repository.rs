//! `PostgreSQL` repository implementation for registry storage.

use super::{
    models::{
        CollaboratorRow, InvitationRow, NewCollaboratorRow, NewInvitationRow, NewProjectRow,
        ProjectRow,
    },
    schema::{project_collaborators, project_invitations, projects},
};
use crate::identity::{EmailAddress, SubjectId};
use crate::project::{
    domain::{
        Collaborator, CollaboratorId, CollaboratorRole, GithubRepo, Invitation, InvitationId,
        InvitationStatus, InvitationToken, PersistedCollaboratorData, PersistedInvitationData,
        PersistedProjectData, Project, ProjectId, ProjectSlug, ProjectStatus,
    },
    ports::{
        CollaboratorRepository, InvitationRepository, ProjectRepository, RegistryRepositoryError,
        RegistryRepositoryResult,
    },
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by registry adapters.
pub type RegistryPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed registry repository.
#[derive(Debug, Clone)]
pub struct PostgresRegistry {
    pool: RegistryPgPool,
}

impl PostgresRegistry {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: RegistryPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> RegistryRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> RegistryRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(RegistryRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(RegistryRepositoryError::persistence)?
    }
}

#[async_trait]
impl ProjectRepository for PostgresRegistry {
    async fn insert_project(&self, project: &Project) -> RegistryRepositoryResult<()> {
        let project_id = project.id();
        let row = project_to_row(project);
        self.run_blocking(move |connection| {
            diesel::insert_into(projects::table)
                .values(&row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        RegistryRepositoryError::DuplicateProject(project_id)
                    }
                    _ => RegistryRepositoryError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn update_project(&self, project: &Project) -> RegistryRepositoryResult<()> {
        let project_id = project.id();
        let row = project_to_row(project);
        self.run_blocking(move |connection| {
            let updated = diesel::update(projects::table.find(project_id.into_inner()))
                .set(&row)
                .execute(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            if updated == 0 {
                return Err(RegistryRepositoryError::ProjectNotFound(project_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_project(&self, id: ProjectId) -> RegistryRepositoryResult<Option<Project>> {
        self.run_blocking(move |connection| {
            let row = projects::table
                .find(id.into_inner())
                .select(ProjectRow::as_select())
                .first::<ProjectRow>(connection)
                .optional()
                .map_err(RegistryRepositoryError::persistence)?;
            row.map(row_to_project).transpose()
        })
        .await
    }

    async fn list_projects_owned_by(
        &self,
        owner: &SubjectId,
    ) -> RegistryRepositoryResult<Vec<Project>> {
        let owner_value = owner.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = projects::table
                .filter(projects::owner_subject.eq(owner_value))
                .order(projects::created_at.asc())
                .select(ProjectRow::as_select())
                .load::<ProjectRow>(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            rows.into_iter().map(row_to_project).collect()
        })
        .await
    }

    async fn delete_project(&self, id: ProjectId) -> RegistryRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(projects::table.find(id.into_inner()))
                .execute(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(RegistryRepositoryError::ProjectNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl CollaboratorRepository for PostgresRegistry {
    async fn upsert_collaborator(
        &self,
        collaborator: &Collaborator,
    ) -> RegistryRepositoryResult<()> {
        let row = collaborator_to_row(collaborator);
        self.run_blocking(move |connection| {
            diesel::insert_into(project_collaborators::table)
                .values(&row)
                .on_conflict((
                    project_collaborators::project_id,
                    project_collaborators::subject,
                ))
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn find_collaborator(
        &self,
        id: CollaboratorId,
    ) -> RegistryRepositoryResult<Option<Collaborator>> {
        self.run_blocking(move |connection| {
            let row = project_collaborators::table
                .find(id.into_inner())
                .select(CollaboratorRow::as_select())
                .first::<CollaboratorRow>(connection)
                .optional()
                .map_err(RegistryRepositoryError::persistence)?;
            row.map(row_to_collaborator).transpose()
        })
        .await
    }

    async fn find_membership(
        &self,
        project_id: ProjectId,
        subject: &SubjectId,
    ) -> RegistryRepositoryResult<Option<Collaborator>> {
        let subject_value = subject.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = project_collaborators::table
                .filter(project_collaborators::project_id.eq(project_id.into_inner()))
                .filter(project_collaborators::subject.eq(subject_value))
                .select(CollaboratorRow::as_select())
                .first::<CollaboratorRow>(connection)
                .optional()
                .map_err(RegistryRepositoryError::persistence)?;
            row.map(row_to_collaborator).transpose()
        })
        .await
    }

    async fn find_membership_by_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Option<Collaborator>> {
        let email_value = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = project_collaborators::table
                .filter(project_collaborators::project_id.eq(project_id.into_inner()))
                .filter(project_collaborators::email.eq(email_value))
                .select(CollaboratorRow::as_select())
                .first::<CollaboratorRow>(connection)
                .optional()
                .map_err(RegistryRepositoryError::persistence)?;
            row.map(row_to_collaborator).transpose()
        })
        .await
    }

    async fn list_collaborators(
        &self,
        project_id: ProjectId,
    ) -> RegistryRepositoryResult<Vec<Collaborator>> {
        self.run_blocking(move |connection| {
            let rows = project_collaborators::table
                .filter(project_collaborators::project_id.eq(project_id.into_inner()))
                .order(project_collaborators::added_at.asc())
                .select(CollaboratorRow::as_select())
                .load::<CollaboratorRow>(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            rows.into_iter().map(row_to_collaborator).collect()
        })
        .await
    }

    async fn list_memberships(
        &self,
        subject: &SubjectId,
    ) -> RegistryRepositoryResult<Vec<Collaborator>> {
        let subject_value = subject.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = project_collaborators::table
                .filter(project_collaborators::subject.eq(subject_value))
                .order(project_collaborators::added_at.asc())
                .select(CollaboratorRow::as_select())
                .load::<CollaboratorRow>(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            rows.into_iter().map(row_to_collaborator).collect()
        })
        .await
    }

    async fn remove_collaborator(&self, id: CollaboratorId) -> RegistryRepositoryResult<()> {
        self.run_blocking(move |connection| {
            let deleted = diesel::delete(project_collaborators::table.find(id.into_inner()))
                .execute(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            if deleted == 0 {
                return Err(RegistryRepositoryError::CollaboratorNotFound(id));
            }
            Ok(())
        })
        .await
    }
}

#[async_trait]
impl InvitationRepository for PostgresRegistry {
    async fn upsert_invitation(&self, invitation: &Invitation) -> RegistryRepositoryResult<()> {
        let row = invitation_to_row(invitation);
        self.run_blocking(move |connection| {
            diesel::insert_into(project_invitations::table)
                .values(&row)
                .on_conflict((
                    project_invitations::project_id,
                    project_invitations::email,
                ))
                .do_update()
                .set(&row)
                .execute(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            Ok(())
        })
        .await
    }

    async fn update_invitation(&self, invitation: &Invitation) -> RegistryRepositoryResult<()> {
        let invitation_id = invitation.id();
        let row = invitation_to_row(invitation);
        self.run_blocking(move |connection| {
            let updated =
                diesel::update(project_invitations::table.find(invitation_id.into_inner()))
                    .set(&row)
                    .execute(connection)
                    .map_err(RegistryRepositoryError::persistence)?;
            if updated == 0 {
                return Err(RegistryRepositoryError::InvitationNotFound(invitation_id));
            }
            Ok(())
        })
        .await
    }

    async fn find_invitation_by_token(
        &self,
        token: &str,
    ) -> RegistryRepositoryResult<Option<Invitation>> {
        let token_value = token.to_owned();
        self.run_blocking(move |connection| {
            let row = project_invitations::table
                .filter(project_invitations::token.eq(token_value))
                .select(InvitationRow::as_select())
                .first::<InvitationRow>(connection)
                .optional()
                .map_err(RegistryRepositoryError::persistence)?;
            row.map(row_to_invitation).transpose()
        })
        .await
    }

    async fn find_invitation_for_email(
        &self,
        project_id: ProjectId,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Option<Invitation>> {
        let email_value = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = project_invitations::table
                .filter(project_invitations::project_id.eq(project_id.into_inner()))
                .filter(project_invitations::email.eq(email_value))
                .select(InvitationRow::as_select())
                .first::<InvitationRow>(connection)
                .optional()
                .map_err(RegistryRepositoryError::persistence)?;
            row.map(row_to_invitation).transpose()
        })
        .await
    }

    async fn list_invitations_for_email(
        &self,
        email: &EmailAddress,
    ) -> RegistryRepositoryResult<Vec<Invitation>> {
        let email_value = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = project_invitations::table
                .filter(project_invitations::email.eq(email_value))
                .order(project_invitations::invited_at.asc())
                .select(InvitationRow::as_select())
                .load::<InvitationRow>(connection)
                .map_err(RegistryRepositoryError::persistence)?;
            rows.into_iter().map(row_to_invitation).collect()
        })
        .await
    }
}

fn project_to_row(project: &Project) -> NewProjectRow {
    NewProjectRow {
        id: project.id().into_inner(),
        slug: project.slug().as_str().to_owned(),
        name: project.name().to_owned(),
        description: project.description().to_owned(),
        kind: project.kind().to_owned(),
        category: project.category().to_owned(),
        status: project.status().as_str().to_owned(),
        github_url: project.github_url().map(str::to_owned),
        github_repo: project.github_repo().map(|repo| repo.as_str().to_owned()),
        github_stars: clamp_counter(project.github_stars()),
        github_forks: clamp_counter(project.github_forks()),
        npm_package: project.npm_package().map(str::to_owned),
        npm_downloads: clamp_counter(project.npm_downloads()),
        owner_subject: project.owner().as_str().to_owned(),
        created_at: project.created_at(),
        updated_at: project.updated_at(),
    }
}

/// Saturates a counter into the signed range of the schema's `Int8` columns.
fn clamp_counter(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn row_to_project(row: ProjectRow) -> RegistryRepositoryResult<Project> {
    let status = ProjectStatus::try_from(row.status.as_str())
        .map_err(RegistryRepositoryError::persistence)?;
    let github_repo = row
        .github_repo
        .map(GithubRepo::new)
        .transpose()
        .map_err(RegistryRepositoryError::persistence)?;
    let owner = SubjectId::new(row.owner_subject).map_err(RegistryRepositoryError::persistence)?;

    Ok(Project::from_persisted(PersistedProjectData {
        id: ProjectId::from_uuid(row.id),
        slug: ProjectSlug::from_persisted(row.slug),
        name: row.name,
        description: row.description,
        kind: row.kind,
        category: row.category,
        status,
        github_url: row.github_url,
        github_repo,
        github_stars: u64::try_from(row.github_stars).unwrap_or(0),
        github_forks: u64::try_from(row.github_forks).unwrap_or(0),
        npm_package: row.npm_package,
        npm_downloads: u64::try_from(row.npm_downloads).unwrap_or(0),
        owner,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}

fn collaborator_to_row(collaborator: &Collaborator) -> NewCollaboratorRow {
    NewCollaboratorRow {
        id: collaborator.id().into_inner(),
        project_id: collaborator.project_id().into_inner(),
        subject: collaborator.subject().as_str().to_owned(),
        email: collaborator.email().as_str().to_owned(),
        role: collaborator.role().as_str().to_owned(),
        added_by: collaborator.added_by().as_str().to_owned(),
        added_at: collaborator.added_at(),
        display_name: collaborator.name().map(str::to_owned),
    }
}

fn row_to_collaborator(row: CollaboratorRow) -> RegistryRepositoryResult<Collaborator> {
    let subject = SubjectId::new(row.subject).map_err(RegistryRepositoryError::persistence)?;
    let email = EmailAddress::parse(row.email).map_err(RegistryRepositoryError::persistence)?;
    let role = CollaboratorRole::try_from(row.role.as_str())
        .map_err(RegistryRepositoryError::persistence)?;
    let added_by = SubjectId::new(row.added_by).map_err(RegistryRepositoryError::persistence)?;

    Ok(Collaborator::from_persisted(PersistedCollaboratorData {
        id: CollaboratorId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        subject,
        email,
        role,
        added_by,
        added_at: row.added_at,
        name: row.display_name,
    }))
}

fn invitation_to_row(invitation: &Invitation) -> NewInvitationRow {
    NewInvitationRow {
        id: invitation.id().into_inner(),
        project_id: invitation.project_id().into_inner(),
        email: invitation.email().as_str().to_owned(),
        role: invitation.role().as_str().to_owned(),
        token: invitation.token().as_str().to_owned(),
        status: invitation.status().as_str().to_owned(),
        invited_by: invitation.invited_by().as_str().to_owned(),
        invited_by_name: invitation.invited_by_name().map(str::to_owned),
        invited_at: invitation.invited_at(),
        expires_at: invitation.expires_at(),
        responded_at: invitation.responded_at(),
        responder_subject: invitation.subject().map(|subject| subject.as_str().to_owned()),
    }
}

fn row_to_invitation(row: InvitationRow) -> RegistryRepositoryResult<Invitation> {
    let email = EmailAddress::parse(row.email).map_err(RegistryRepositoryError::persistence)?;
    let role = CollaboratorRole::try_from(row.role.as_str())
        .map_err(RegistryRepositoryError::persistence)?;
    let status = InvitationStatus::try_from(row.status.as_str())
        .map_err(RegistryRepositoryError::persistence)?;
    let invited_by =
        SubjectId::new(row.invited_by).map_err(RegistryRepositoryError::persistence)?;
    let subject = row
        .responder_subject
        .map(SubjectId::new)
        .transpose()
        .map_err(RegistryRepositoryError::persistence)?;

    Ok(Invitation::from_persisted(PersistedInvitationData {
        id: InvitationId::from_uuid(row.id),
        project_id: ProjectId::from_uuid(row.project_id),
        email,
        role,
        token: InvitationToken::from_persisted(row.token),
        status,
        invited_by,
        invited_by_name: row.invited_by_name,
        invited_at: row.invited_at,
        expires_at: row.expires_at,
        responded_at: row.responded_at,
        subject,
    }))
}
