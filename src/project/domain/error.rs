//! Error types for project registry domain validation and parsing.

use thiserror::Error;

/// Errors returned while constructing project domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProjectDomainError {
    /// The project name is empty after trimming.
    #[error("project name must not be empty")]
    EmptyProjectName,

    /// The repository slug does not follow `owner/repo` format.
    #[error("invalid GitHub repository '{0}', expected owner/repo")]
    InvalidGithubRepo(String),
}

/// Error returned while parsing project statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown project status: {0}")]
pub struct ParseProjectStatusError(pub String);

/// Error returned while parsing collaborator roles from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown collaborator role: {0}")]
pub struct ParseCollaboratorRoleError(pub String);

/// Error returned while parsing invitation statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown invitation status: {0}")]
pub struct ParseInvitationStatusError(pub String);

/// Terminal invitation conditions surfaced to the responding user.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvitationError {
    /// The invitation was already accepted, declined, or expired.
    #[error("invitation has already been processed")]
    AlreadyProcessed,

    /// The invitation validity window has passed.
    #[error("invitation has expired")]
    Expired,

    /// The responding identity's email does not match the invited address.
    #[error("invitation was issued to a different email address")]
    EmailMismatch,
}
