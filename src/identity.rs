//! Per-request identity value objects.
//!
//! Identity is supplied by an external provider on every call and is never
//! persisted by this crate. Mutations reject an absent identity; queries
//! degrade to empty results.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors returned while constructing identity values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityError {
    /// The subject identifier is empty after trimming.
    #[error("subject identifier must not be empty")]
    EmptySubject,

    /// The email address is not structurally valid.
    #[error("invalid email address: {0}")]
    InvalidEmail(String),
}

/// Opaque stable subject identifier issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubjectId(String);

impl SubjectId {
    /// Creates a validated subject identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::EmptySubject`] when the value is empty after
    /// trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(IdentityError::EmptySubject);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the subject identifier as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for SubjectId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Normalized email address (trimmed, lowercase).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses and normalizes an email address.
    ///
    /// Normalization trims surrounding whitespace and lowercases the whole
    /// address, matching the form stored on invitations and share sets so
    /// that membership checks compare equal.
    ///
    /// # Errors
    ///
    /// Returns [`IdentityError::InvalidEmail`] when the value lacks an `@`
    /// with non-empty local and domain parts.
    pub fn parse(value: impl Into<String>) -> Result<Self, IdentityError> {
        let raw = value.into();
        let normalized = raw.trim().to_lowercase();
        let valid = normalized
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !valid {
            return Err(IdentityError::InvalidEmail(raw));
        }
        Ok(Self(normalized))
    }

    /// Returns the normalized address as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Authenticated caller identity for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    subject: SubjectId,
    email: Option<EmailAddress>,
    name: Option<String>,
}

impl Identity {
    /// Creates an identity with only a subject identifier.
    #[must_use]
    pub const fn new(subject: SubjectId) -> Self {
        Self {
            subject,
            email: None,
            name: None,
        }
    }

    /// Sets the verified email address.
    #[must_use]
    pub fn with_email(mut self, email: EmailAddress) -> Self {
        self.email = Some(email);
        self
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Returns the subject identifier.
    #[must_use]
    pub const fn subject(&self) -> &SubjectId {
        &self.subject
    }

    /// Returns the verified email address, if any.
    #[must_use]
    pub const fn email(&self) -> Option<&EmailAddress> {
        self.email.as_ref()
    }

    /// Returns the display name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the best human-facing label: name, then email, then subject.
    #[must_use]
    pub fn display_label(&self) -> &str {
        if let Some(name) = self.name.as_deref() {
            return name;
        }
        self.email
            .as_ref()
            .map_or_else(|| self.subject.as_str(), EmailAddress::as_str)
    }
}
