//! Share sets: the emails a task is visible to beyond its owner.

use crate::identity::EmailAddress;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Set of normalized emails a task is shared with.
///
/// An empty set means the task is private. Sharing is additive: bulk
/// sharing unions new emails in and never removes existing ones; the only
/// removal operation clears the whole set.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareSet(BTreeSet<EmailAddress>);

impl ShareSet {
    /// Creates an empty share set.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Returns whether the email is in the set.
    #[must_use]
    pub fn contains(&self, email: &EmailAddress) -> bool {
        self.0.contains(email)
    }

    /// Returns whether the set is empty (the task is private).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of shared emails.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Adds an email. Returns `true` when it was not present before.
    pub fn insert(&mut self, email: EmailAddress) -> bool {
        self.0.insert(email)
    }

    /// Unions emails into the set and returns how many were new.
    pub fn extend(&mut self, emails: impl IntoIterator<Item = EmailAddress>) -> usize {
        emails
            .into_iter()
            .filter(|email| self.0.insert(email.clone()))
            .count()
    }

    /// Clears the whole set.
    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Iterates the shared emails in normalized order.
    pub fn iter(&self) -> impl Iterator<Item = &EmailAddress> {
        self.0.iter()
    }
}

impl FromIterator<EmailAddress> for ShareSet {
    fn from_iter<I: IntoIterator<Item = EmailAddress>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
