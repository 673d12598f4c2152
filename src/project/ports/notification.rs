//! Outbound notification port for invitation emails.
//!
//! Dispatch is fire-and-forget: the invitation row is the source of truth
//! and a delivery failure must never roll back the inviting mutation.

use crate::identity::EmailAddress;
use crate::project::domain::CollaboratorRole;
use async_trait::async_trait;
use thiserror::Error;

/// Payload handed to the notification sink after an invitation upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvitationNotice {
    /// Invited email address.
    pub to: EmailAddress,
    /// Display name of the inviter.
    pub inviter_name: String,
    /// Name of the project the invitation grants access to.
    pub project_name: String,
    /// Offered role.
    pub role: CollaboratorRole,
    /// Current link token, embedded in accept/decline URLs.
    pub token: String,
}

/// Errors returned by notification sink implementations.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The message template failed to render.
    #[error("notification template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The message could not be handed to the delivery channel.
    #[error("notification dispatch failed: {0}")]
    Dispatch(String),
}

/// Fire-and-forget invitation notification contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InvitationNotifier: Send + Sync {
    /// Dispatches a notification for a freshly created or refreshed
    /// invitation.
    ///
    /// # Errors
    ///
    /// Returns [`NotificationError`] when rendering or hand-off fails;
    /// callers log and drop the failure.
    async fn invitation_created(&self, notice: &InvitationNotice) -> Result<(), NotificationError>;
}
