//! Domain model for the project and collaborator registry.
//!
//! Models project ownership, collaborator membership, and the email
//! invitation lifecycle while keeping infrastructure concerns outside the
//! domain boundary.

mod collaborator;
mod error;
mod github;
mod ids;
mod invitation;
mod project;

pub use collaborator::{
    Collaborator, CollaboratorRole, PersistedCollaboratorData, ProjectRole,
};
pub use error::{
    InvitationError, ParseCollaboratorRoleError, ParseInvitationStatusError,
    ParseProjectStatusError, ProjectDomainError,
};
pub use github::GithubRepo;
pub use ids::{CollaboratorId, InvitationId, ProjectId, ProjectSlug};
pub use invitation::{
    Invitation, InvitationStatus, InvitationToken, PersistedInvitationData,
};
pub use project::{
    PersistedProjectData, Project, ProjectSeed, ProjectStatus, ProjectUpdate,
};
