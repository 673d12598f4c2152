//! Defensive ingestion of legacy JSON pseudo-columns.
//!
//! Earlier schema versions stored share lists and selection maps as JSON
//! text on the task row. Shares and selections are genuine relations now,
//! but un-migrated rows still carry the old columns; these parsers recover
//! whatever is readable and treat malformed payloads as empty rather than
//! failing the read.

use crate::identity::EmailAddress;
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Parses a legacy share list: a JSON array of email strings.
///
/// Malformed JSON, non-array payloads, and invalid entries are dropped
/// with a warning; the result is whatever subset parsed cleanly.
#[must_use]
pub fn parse_legacy_share_list(raw: &str) -> BTreeSet<EmailAddress> {
    let Ok(Value::Array(entries)) = serde_json::from_str::<Value>(raw) else {
        tracing::warn!(payload_bytes = raw.len(), "unreadable legacy share list; treating as empty");
        return BTreeSet::new();
    };
    entries
        .iter()
        .filter_map(Value::as_str)
        .filter_map(|entry| EmailAddress::parse(entry).ok())
        .collect()
}

/// Parses a legacy selection map: a JSON object of email to epoch
/// milliseconds.
///
/// Malformed JSON, non-object payloads, and invalid entries are dropped
/// with a warning; the result is whatever subset parsed cleanly.
#[must_use]
pub fn parse_legacy_selection_map(raw: &str) -> BTreeMap<EmailAddress, DateTime<Utc>> {
    let Ok(Value::Object(entries)) = serde_json::from_str::<Value>(raw) else {
        tracing::warn!(
            payload_bytes = raw.len(),
            "unreadable legacy selection map; treating as empty"
        );
        return BTreeMap::new();
    };
    entries
        .iter()
        .filter_map(|(email, instant)| {
            let email = EmailAddress::parse(email.as_str()).ok()?;
            let instant = instant
                .as_i64()
                .and_then(DateTime::from_timestamp_millis)?;
            Some((email, instant))
        })
        .collect()
}
