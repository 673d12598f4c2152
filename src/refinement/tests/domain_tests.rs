//! Unit tests for refinement entry construction rules.

use crate::clock::FixedClock;
use crate::identity::{EmailAddress, SubjectId};
use crate::refinement::domain::{
    Author, AuthorRole, Refinement, RefinementDomainError, RefinementKind,
};
use crate::task::domain::TaskId;
use chrono::{DateTime, TimeZone, Utc};
use eyre::{bail, ensure};
use rstest::{fixture, rstest};

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn clock() -> FixedClock {
    FixedClock::at(base_time())
}

fn author() -> Author {
    Author {
        subject: SubjectId::new("subject-owner").expect("valid subject"),
        email: EmailAddress::parse("owner@example.com").expect("valid email"),
        name: Some("Olive Owner".to_owned()),
    }
}

#[rstest]
#[case(RefinementKind::Note)]
#[case(RefinementKind::Question)]
#[case(RefinementKind::Update)]
fn posting_threads_kinds_succeeds(clock: FixedClock, #[case] kind: RefinementKind) {
    let posted = Refinement::post(
        TaskId::new(),
        author(),
        AuthorRole::Owner,
        kind,
        "What about error handling?",
        &clock,
    );
    assert!(posted.is_ok_and(|entry| entry.kind() == kind && entry.parent_id().is_none()));
}

#[rstest]
fn posting_an_answer_directly_is_rejected(clock: FixedClock) -> eyre::Result<()> {
    let result = Refinement::post(
        TaskId::new(),
        author(),
        AuthorRole::Owner,
        RefinementKind::Answer,
        "answered out of band",
        &clock,
    );

    if result != Err(RefinementDomainError::AnswerOutsideThread) {
        bail!("expected AnswerOutsideThread, got {result:?}");
    }
    Ok(())
}

#[rstest]
fn blank_content_is_rejected(clock: FixedClock) -> eyre::Result<()> {
    let result = Refinement::post(
        TaskId::new(),
        author(),
        AuthorRole::Collaborator,
        RefinementKind::Note,
        "   ",
        &clock,
    );

    if result != Err(RefinementDomainError::EmptyContent) {
        bail!("expected EmptyContent, got {result:?}");
    }
    Ok(())
}

#[rstest]
fn answers_reference_their_question(clock: FixedClock) -> eyre::Result<()> {
    let question = Refinement::post(
        TaskId::new(),
        author(),
        AuthorRole::Collaborator,
        RefinementKind::Question,
        "Should retries back off?",
        &clock,
    )?;

    let answer = Refinement::answer_to(&question, author(), "Yes, exponentially.", &clock)?;

    ensure!(answer.kind() == RefinementKind::Answer);
    ensure!(answer.parent_id() == Some(question.id()));
    ensure!(answer.task_id() == question.task_id());
    ensure!(answer.role() == AuthorRole::Owner);
    Ok(())
}

#[rstest]
fn answering_a_non_question_is_rejected(clock: FixedClock) -> eyre::Result<()> {
    let note = Refinement::post(
        TaskId::new(),
        author(),
        AuthorRole::Owner,
        RefinementKind::Note,
        "Just a note",
        &clock,
    )?;

    let result = Refinement::answer_to(&note, author(), "answering a note", &clock);

    if result != Err(RefinementDomainError::NotAQuestion(note.id())) {
        bail!("expected NotAQuestion, got {result:?}");
    }
    Ok(())
}
