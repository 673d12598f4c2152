//! Unit tests for defensive legacy JSON ingestion.

use crate::identity::EmailAddress;
use crate::task::domain::legacy::{parse_legacy_selection_map, parse_legacy_share_list};
use chrono::DateTime;
use eyre::ensure;
use rstest::rstest;

#[rstest]
fn valid_share_list_parses_and_normalizes() -> eyre::Result<()> {
    let shares = parse_legacy_share_list(r#"["A@X.com", "b@y.com"]"#);
    ensure!(shares.len() == 2);
    ensure!(shares.contains(&EmailAddress::parse("a@x.com")?));
    ensure!(shares.contains(&EmailAddress::parse("b@y.com")?));
    Ok(())
}

#[rstest]
#[case("not json at all")]
#[case(r#"{"unexpected": "object"}"#)]
#[case(r#"["unterminated"#)]
#[case("42")]
fn malformed_share_payloads_are_treated_as_empty(#[case] raw: &str) {
    assert!(parse_legacy_share_list(raw).is_empty());
}

#[rstest]
fn invalid_entries_in_a_share_list_are_dropped() -> eyre::Result<()> {
    let shares = parse_legacy_share_list(r#"["a@x.com", "not-an-email", 7, null]"#);
    ensure!(shares.len() == 1);
    ensure!(shares.contains(&EmailAddress::parse("a@x.com")?));
    Ok(())
}

#[rstest]
fn valid_selection_map_parses_epoch_milliseconds() -> eyre::Result<()> {
    let selections = parse_legacy_selection_map(r#"{"b@y.com": 1715700000000}"#);
    ensure!(selections.len() == 1);
    let instant = selections
        .get(&EmailAddress::parse("b@y.com")?)
        .copied()
        .expect("entry present");
    ensure!(instant == DateTime::from_timestamp_millis(1_715_700_000_000).expect("valid instant"));
    Ok(())
}

#[rstest]
#[case("not json at all")]
#[case(r#"["an", "array"]"#)]
#[case("null")]
fn malformed_selection_payloads_are_treated_as_empty(#[case] raw: &str) {
    assert!(parse_legacy_selection_map(raw).is_empty());
}

#[rstest]
fn invalid_selection_entries_are_dropped() -> eyre::Result<()> {
    let selections = parse_legacy_selection_map(
        r#"{"b@y.com": 1715700000000, "bad-email": 1715700000000, "c@z.com": "yesterday"}"#,
    );
    ensure!(selections.len() == 1);
    ensure!(selections.contains_key(&EmailAddress::parse("b@y.com")?));
    Ok(())
}
