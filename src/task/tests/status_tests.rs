//! Unit tests for task status and priority parsing.

use crate::task::domain::{Priority, TaskStatus};
use rstest::rstest;

#[rstest]
#[case("todo", TaskStatus::Todo)]
#[case("in-progress", TaskStatus::InProgress)]
#[case("done", TaskStatus::Done)]
#[case("backlog", TaskStatus::Todo)]
#[case("running", TaskStatus::InProgress)]
#[case("completed", TaskStatus::Done)]
#[case(" Done ", TaskStatus::Done)]
fn status_parsing_tolerates_legacy_synonyms(#[case] stored: &str, #[case] expected: TaskStatus) {
    assert_eq!(TaskStatus::try_from(stored), Ok(expected));
}

#[rstest]
fn unknown_status_is_rejected() {
    assert!(TaskStatus::try_from("paused").is_err());
}

#[rstest]
#[case(TaskStatus::Todo, "todo")]
#[case(TaskStatus::InProgress, "in-progress")]
#[case(TaskStatus::Done, "done")]
fn status_storage_form_is_canonical(#[case] status: TaskStatus, #[case] stored: &str) {
    assert_eq!(status.as_str(), stored);
}

#[rstest]
#[case("low", Priority::Low)]
#[case("medium", Priority::Medium)]
#[case("high", Priority::High)]
fn priority_round_trips(#[case] stored: &str, #[case] expected: Priority) {
    assert_eq!(Priority::try_from(stored), Ok(expected));
    assert_eq!(expected.as_str(), stored);
}

#[rstest]
fn priority_defaults_to_medium() {
    assert_eq!(Priority::default(), Priority::Medium);
}
