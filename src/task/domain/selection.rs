//! Daily selection ledger for collaborative task runs.
//!
//! A selection is a daily commitment: it authorizes its holder to run the
//! task's timer for the rest of the calendar day it was made, then lapses
//! at midnight regardless of elapsed wall-clock hours. Days are computed
//! in UTC on every read and write path so selections lapse consistently.

use crate::identity::EmailAddress;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Returns the UTC calendar day an instant falls on.
#[must_use]
pub fn selection_day(instant: DateTime<Utc>) -> NaiveDate {
    instant.date_naive()
}

/// Map of email to the instant that email selected the task.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionLedger(BTreeMap<EmailAddress, DateTime<Utc>>);

impl SelectionLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the selection instant for an email, if any.
    #[must_use]
    pub fn instant_for(&self, email: &EmailAddress) -> Option<DateTime<Utc>> {
        self.0.get(email).copied()
    }

    /// Returns whether the email holds a selection made on the given day.
    #[must_use]
    pub fn selected_on(&self, email: &EmailAddress, day: NaiveDate) -> bool {
        self.0
            .get(email)
            .is_some_and(|instant| selection_day(*instant) == day)
    }

    /// Records a selection at the given instant.
    ///
    /// A selection already made on the same UTC day is kept at its original
    /// instant and the call is a no-op returning `false`; a stale selection
    /// from an earlier day is overwritten.
    pub fn select(&mut self, email: EmailAddress, now: DateTime<Utc>) -> bool {
        if self.selected_on(&email, selection_day(now)) {
            return false;
        }
        self.0.insert(email, now);
        true
    }

    /// Removes the email's selection. Returns `true` when one existed.
    pub fn deselect(&mut self, email: &EmailAddress) -> bool {
        self.0.remove(email).is_some()
    }

    /// Returns whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of recorded selections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterates `(email, instant)` entries in normalized email order.
    pub fn iter(&self) -> impl Iterator<Item = (&EmailAddress, &DateTime<Utc>)> {
        self.0.iter()
    }
}

impl FromIterator<(EmailAddress, DateTime<Utc>)> for SelectionLedger {
    fn from_iter<I: IntoIterator<Item = (EmailAddress, DateTime<Utc>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
