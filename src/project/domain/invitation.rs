//! Invitation aggregate and its response state machine.

use super::{
    CollaboratorRole, InvitationError, InvitationId, ParseInvitationStatusError, ProjectId,
};
use crate::identity::{EmailAddress, SubjectId};
use chrono::{DateTime, Duration, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Opaque unguessable invitation token carried in accept/decline links.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InvitationToken(String);

impl InvitationToken {
    /// Generates a fresh token.
    ///
    /// The token is the hex digest of two random UUIDs, giving 256 bits of
    /// output keyed by 244 bits of randomness. It is compared only for
    /// equality and rotated whenever an invitation is responded to.
    #[must_use]
    pub fn generate() -> Self {
        let mut hasher = Sha256::new();
        hasher.update(Uuid::new_v4().as_bytes());
        hasher.update(Uuid::new_v4().as_bytes());
        let digest = hasher.finalize();
        Self(digest.iter().map(|byte| format!("{byte:02x}")).collect())
    }

    /// Reconstructs a token from persisted storage.
    #[must_use]
    pub const fn from_persisted(value: String) -> Self {
        Self(value)
    }

    /// Returns the token as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for InvitationToken {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for InvitationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Invitation response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    /// Awaiting a response.
    Pending,
    /// Accepted; a collaborator row exists.
    Accepted,
    /// Declined by the invitee.
    Declined,
    /// Validity window passed before a response.
    Expired,
}

impl InvitationStatus {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Declined => "declined",
            Self::Expired => "expired",
        }
    }
}

impl TryFrom<&str> for InvitationStatus {
    type Error = ParseInvitationStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pending" => Ok(Self::Pending),
            "accepted" => Ok(Self::Accepted),
            "declined" => Ok(Self::Declined),
            "expired" => Ok(Self::Expired),
            _ => Err(ParseInvitationStatusError(value.to_owned())),
        }
    }
}

/// Invitation aggregate root.
///
/// At most one invitation exists per `(project, email)`; re-inviting
/// refreshes the existing row instead of creating a duplicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invitation {
    id: InvitationId,
    project_id: ProjectId,
    email: EmailAddress,
    role: CollaboratorRole,
    token: InvitationToken,
    status: InvitationStatus,
    invited_by: SubjectId,
    invited_by_name: Option<String>,
    invited_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    responded_at: Option<DateTime<Utc>>,
    subject: Option<SubjectId>,
}

/// Parameter object for reconstructing a persisted invitation aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedInvitationData {
    /// Persisted invitation identifier.
    pub id: InvitationId,
    /// Persisted project reference.
    pub project_id: ProjectId,
    /// Persisted invited email.
    pub email: EmailAddress,
    /// Persisted offered role.
    pub role: CollaboratorRole,
    /// Persisted link token.
    pub token: InvitationToken,
    /// Persisted response status.
    pub status: InvitationStatus,
    /// Persisted inviter subject.
    pub invited_by: SubjectId,
    /// Persisted inviter display name, if any.
    pub invited_by_name: Option<String>,
    /// Persisted invitation timestamp.
    pub invited_at: DateTime<Utc>,
    /// Persisted expiry instant.
    pub expires_at: DateTime<Utc>,
    /// Persisted response timestamp, if any.
    pub responded_at: Option<DateTime<Utc>>,
    /// Persisted responder subject, if any.
    pub subject: Option<SubjectId>,
}

impl Invitation {
    /// Invitation validity window from the moment of (re-)invitation.
    const VALIDITY_DAYS: i64 = 7;

    /// Creates a pending invitation with a fresh token and expiry window.
    #[must_use]
    pub fn new(
        project_id: ProjectId,
        email: EmailAddress,
        role: CollaboratorRole,
        invited_by: SubjectId,
        invited_by_name: Option<String>,
        clock: &impl Clock,
    ) -> Self {
        let invited_at = clock.utc();
        Self {
            id: InvitationId::new(),
            project_id,
            email,
            role,
            token: InvitationToken::generate(),
            status: InvitationStatus::Pending,
            invited_by,
            invited_by_name,
            invited_at,
            expires_at: invited_at + Duration::days(Self::VALIDITY_DAYS),
            responded_at: None,
            subject: None,
        }
    }

    /// Reconstructs an invitation from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedInvitationData) -> Self {
        Self {
            id: data.id,
            project_id: data.project_id,
            email: data.email,
            role: data.role,
            token: data.token,
            status: data.status,
            invited_by: data.invited_by,
            invited_by_name: data.invited_by_name,
            invited_at: data.invited_at,
            expires_at: data.expires_at,
            responded_at: data.responded_at,
            subject: data.subject,
        }
    }

    /// Returns the invitation identifier.
    #[must_use]
    pub const fn id(&self) -> InvitationId {
        self.id
    }

    /// Returns the project reference.
    #[must_use]
    pub const fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// Returns the invited email.
    #[must_use]
    pub const fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Returns the offered role.
    #[must_use]
    pub const fn role(&self) -> CollaboratorRole {
        self.role
    }

    /// Returns the current link token.
    #[must_use]
    pub const fn token(&self) -> &InvitationToken {
        &self.token
    }

    /// Returns the response status.
    #[must_use]
    pub const fn status(&self) -> InvitationStatus {
        self.status
    }

    /// Returns the inviter subject.
    #[must_use]
    pub const fn invited_by(&self) -> &SubjectId {
        &self.invited_by
    }

    /// Returns the inviter display name, if any.
    #[must_use]
    pub fn invited_by_name(&self) -> Option<&str> {
        self.invited_by_name.as_deref()
    }

    /// Returns the invitation timestamp.
    #[must_use]
    pub const fn invited_at(&self) -> DateTime<Utc> {
        self.invited_at
    }

    /// Returns the expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the response timestamp, if any.
    #[must_use]
    pub const fn responded_at(&self) -> Option<DateTime<Utc>> {
        self.responded_at
    }

    /// Returns the responder subject, if any.
    #[must_use]
    pub const fn subject(&self) -> Option<&SubjectId> {
        self.subject.as_ref()
    }

    /// Refreshes the invitation for a re-invite: new token, pending status,
    /// a reset validity window, and the latest inviter attribution.
    pub fn refresh(
        &mut self,
        role: CollaboratorRole,
        invited_by: SubjectId,
        invited_by_name: Option<String>,
        clock: &impl Clock,
    ) {
        let invited_at = clock.utc();
        self.role = role;
        self.token = InvitationToken::generate();
        self.status = InvitationStatus::Pending;
        self.invited_by = invited_by;
        self.invited_by_name = invited_by_name;
        self.invited_at = invited_at;
        self.expires_at = invited_at + Duration::days(Self::VALIDITY_DAYS);
        self.responded_at = None;
        self.subject = None;
    }

    /// Accepts the invitation on behalf of the responding identity.
    ///
    /// On success the status becomes accepted and the token is rotated so
    /// the original link cannot be replayed. When the validity window has
    /// strictly passed, the status flips to expired **as a side effect** —
    /// callers must persist the aggregate even on that failure.
    ///
    /// # Errors
    ///
    /// Returns [`InvitationError::AlreadyProcessed`] when not pending,
    /// [`InvitationError::Expired`] past the validity window, and
    /// [`InvitationError::EmailMismatch`] when the responder's email
    /// differs from the invited address.
    pub fn accept(
        &mut self,
        subject: SubjectId,
        email: &EmailAddress,
        clock: &impl Clock,
    ) -> Result<(), InvitationError> {
        self.respond(subject, email, InvitationStatus::Accepted, clock)
    }

    /// Declines the invitation on behalf of the responding identity.
    ///
    /// Same resolution and email-match rules as [`Invitation::accept`];
    /// the token is likewise rotated.
    ///
    /// # Errors
    ///
    /// Returns the same [`InvitationError`] variants as
    /// [`Invitation::accept`].
    pub fn decline(
        &mut self,
        subject: SubjectId,
        email: &EmailAddress,
        clock: &impl Clock,
    ) -> Result<(), InvitationError> {
        self.respond(subject, email, InvitationStatus::Declined, clock)
    }

    fn respond(
        &mut self,
        subject: SubjectId,
        email: &EmailAddress,
        outcome: InvitationStatus,
        clock: &impl Clock,
    ) -> Result<(), InvitationError> {
        if self.status != InvitationStatus::Pending {
            return Err(InvitationError::AlreadyProcessed);
        }
        let now = clock.utc();
        if now > self.expires_at {
            self.status = InvitationStatus::Expired;
            return Err(InvitationError::Expired);
        }
        if *email != self.email {
            return Err(InvitationError::EmailMismatch);
        }

        self.status = outcome;
        self.responded_at = Some(now);
        self.subject = Some(subject);
        self.token = InvitationToken::generate();
        Ok(())
    }
}
