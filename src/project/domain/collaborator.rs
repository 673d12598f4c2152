//! Collaborator membership rows and roles.

use super::{CollaboratorId, ParseCollaboratorRoleError, ProjectId};
use crate::identity::{EmailAddress, SubjectId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Role granted to a project collaborator.
///
/// The project owner is implicit via the project record and never appears
/// as a membership row; "collaborator" is currently the only granted role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollaboratorRole {
    /// Standard collaborator: may view the project and edit shared tasks.
    #[default]
    Collaborator,
}

impl CollaboratorRole {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collaborator => "collaborator",
        }
    }
}

impl TryFrom<&str> for CollaboratorRole {
    type Error = ParseCollaboratorRoleError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "collaborator" => Ok(Self::Collaborator),
            _ => Err(ParseCollaboratorRoleError(value.to_owned())),
        }
    }
}

/// Caller's relationship to a project.
///
/// Every authorization decision in the registry resolves through this type
/// so the owner/collaborator matrix stays consistent across handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectRole {
    /// The caller owns the project.
    Owner,
    /// The caller holds a membership row with the given role.
    Collaborator(CollaboratorRole),
}

impl ProjectRole {
    /// Returns the human-facing role label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Collaborator(role) => role.as_str(),
        }
    }
}

/// Collaborator membership row, created when an invitation is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    id: CollaboratorId,
    project_id: ProjectId,
    subject: SubjectId,
    email: EmailAddress,
    role: CollaboratorRole,
    added_by: SubjectId,
    added_at: DateTime<Utc>,
    name: Option<String>,
}

/// Parameter object for reconstructing a persisted collaborator row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedCollaboratorData {
    /// Persisted row identifier.
    pub id: CollaboratorId,
    /// Persisted project reference.
    pub project_id: ProjectId,
    /// Persisted member subject.
    pub subject: SubjectId,
    /// Persisted member email.
    pub email: EmailAddress,
    /// Persisted role.
    pub role: CollaboratorRole,
    /// Persisted inviter subject.
    pub added_by: SubjectId,
    /// Persisted membership timestamp.
    pub added_at: DateTime<Utc>,
    /// Persisted display name, if any.
    pub name: Option<String>,
}

impl Collaborator {
    /// Creates a new membership row.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        subject: SubjectId,
        email: EmailAddress,
        role: CollaboratorRole,
        added_by: SubjectId,
        clock: &impl Clock,
    ) -> Self {
        Self {
            id: CollaboratorId::new(),
            project_id,
            subject,
            email,
            role,
            added_by,
            added_at: clock.utc(),
            name: None,
        }
    }

    /// Reconstructs a membership row from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedCollaboratorData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            subject: data.subject,
            email: data.email,
            role: data.role,
            added_by: data.added_by,
            added_at: data.added_at,
            name: data.name,
        }
    }

    /// Returns the row identifier.
    #[must_use]
    pub const fn id(&self) -> CollaboratorId {
        self.id
    }

    /// Returns the project reference.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the member subject.
    #[must_use]
    pub const fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Returns the member email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the granted role.
    #[must_use]
    pub const fn role(&self) -> CollaboratorRole {
        self.role
    }

    /// Returns the inviter subject.
    #[must_use]
    pub const fn added_by(&self) -> &SubjectId {
        &self.added_by
    }

    /// Returns the membership timestamp.
    #[must_use]
    pub const fn added_at(&self) -> DateTime<Utc> {
        self.added_at
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Refreshes role and display name, used when a member re-accepts.
    pub fn update_profile(&mut self, role: CollaboratorRole, name: Option<String>) {
        self.role = role;
        if name.is_some() {
            self.name = name;
        }
    }
}
