//! Diesel row models for registry persistence.

use super::schema::{project_collaborators, project_invitations, projects};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for project records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = projects)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Human-facing slug.
    pub slug: String,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Project kind.
    pub kind: String,
    /// Project category.
    pub category: String,
    /// Release status.
    pub status: String,
    /// Optional GitHub URL.
    pub github_url: Option<String>,
    /// Optional repository slug.
    pub github_repo: Option<String>,
    /// Stargazer counter.
    pub github_stars: i64,
    /// Fork counter.
    pub github_forks: i64,
    /// Optional npm package name.
    pub npm_package: Option<String>,
    /// npm download counter.
    pub npm_downloads: i64,
    /// Owner subject identifier.
    pub owner_subject: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for project records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = projects)]
#[diesel(treat_none_as_null = true)]
pub struct NewProjectRow {
    /// Project identifier.
    pub id: uuid::Uuid,
    /// Human-facing slug.
    pub slug: String,
    /// Project name.
    pub name: String,
    /// Project description.
    pub description: String,
    /// Project kind.
    pub kind: String,
    /// Project category.
    pub category: String,
    /// Release status.
    pub status: String,
    /// Optional GitHub URL.
    pub github_url: Option<String>,
    /// Optional repository slug.
    pub github_repo: Option<String>,
    /// Stargazer counter.
    pub github_stars: i64,
    /// Fork counter.
    pub github_forks: i64,
    /// Optional npm package name.
    pub npm_package: Option<String>,
    /// npm download counter.
    pub npm_downloads: i64,
    /// Owner subject identifier.
    pub owner_subject: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for collaborator membership records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_collaborators)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CollaboratorRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Project reference.
    pub project_id: uuid::Uuid,
    /// Member subject identifier.
    pub subject: String,
    /// Member email.
    pub email: String,
    /// Granted role.
    pub role: String,
    /// Inviter subject identifier.
    pub added_by: String,
    /// Membership timestamp.
    pub added_at: DateTime<Utc>,
    /// Optional display name.
    pub display_name: Option<String>,
}

/// Insert and update model for collaborator membership records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = project_collaborators)]
#[diesel(treat_none_as_null = true)]
pub struct NewCollaboratorRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Project reference.
    pub project_id: uuid::Uuid,
    /// Member subject identifier.
    pub subject: String,
    /// Member email.
    pub email: String,
    /// Granted role.
    pub role: String,
    /// Inviter subject identifier.
    pub added_by: String,
    /// Membership timestamp.
    pub added_at: DateTime<Utc>,
    /// Optional display name.
    pub display_name: Option<String>,
}

/// Query result row for invitation records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = project_invitations)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct InvitationRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Project reference.
    pub project_id: uuid::Uuid,
    /// Invited email.
    pub email: String,
    /// Offered role.
    pub role: String,
    /// Current link token.
    pub token: String,
    /// Response status.
    pub status: String,
    /// Inviter subject identifier.
    pub invited_by: String,
    /// Optional inviter display name.
    pub invited_by_name: Option<String>,
    /// Invitation timestamp.
    pub invited_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Optional response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
    /// Optional responder subject identifier.
    pub responder_subject: Option<String>,
}

/// Insert and update model for invitation records.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = project_invitations)]
#[diesel(treat_none_as_null = true)]
pub struct NewInvitationRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Project reference.
    pub project_id: uuid::Uuid,
    /// Invited email.
    pub email: String,
    /// Offered role.
    pub role: String,
    /// Current link token.
    pub token: String,
    /// Response status.
    pub status: String,
    /// Inviter subject identifier.
    pub invited_by: String,
    /// Optional inviter display name.
    pub invited_by_name: Option<String>,
    /// Invitation timestamp.
    pub invited_at: DateTime<Utc>,
    /// Expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Optional response timestamp.
    pub responded_at: Option<DateTime<Utc>>,
    /// Optional responder subject identifier.
    pub responder_subject: Option<String>,
}
