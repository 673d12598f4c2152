//! Service orchestration tests for refinement threads over the in-memory
//! adapters and the task-engine directory.

use std::sync::Arc;

use crate::clock::FixedClock;
use crate::identity::{EmailAddress, Identity, SubjectId};
use crate::refinement::{
    adapters::{LifecycleTaskDirectory, memory::InMemoryRefinementRepository},
    domain::{AuthorRole, RefinementDomainError, RefinementKind},
    services::{RefinementThreadError, RefinementThreadService},
};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Task, TaskId, TaskSeed},
    ports::TaskRepository,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use eyre::{bail, ensure};
use rstest::{fixture, rstest};

type TestService = RefinementThreadService<
    InMemoryRefinementRepository,
    LifecycleTaskDirectory<InMemoryTaskRepository>,
    FixedClock,
>;

struct Harness {
    service: TestService,
    tasks: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn harness() -> Harness {
    let tasks = Arc::new(InMemoryTaskRepository::new());
    let clock = Arc::new(FixedClock::at(base_time()));
    Harness {
        service: RefinementThreadService::new(
            Arc::new(InMemoryRefinementRepository::new()),
            Arc::new(LifecycleTaskDirectory::new(Arc::clone(&tasks))),
            Arc::clone(&clock),
        ),
        tasks,
        clock,
    }
}

fn owner_identity() -> Identity {
    Identity::new(SubjectId::new("subject-owner").expect("valid subject"))
        .with_email(EmailAddress::parse("owner@example.com").expect("valid email"))
        .with_name("Olive Owner")
}

fn collaborator_identity() -> Identity {
    Identity::new(SubjectId::new("subject-collab").expect("valid subject"))
        .with_email(EmailAddress::parse("b@y.com").expect("valid email"))
}

fn stranger_identity() -> Identity {
    Identity::new(SubjectId::new("subject-stranger").expect("valid subject"))
        .with_email(EmailAddress::parse("c@z.com").expect("valid email"))
}

async fn seed_shared_task(harness: &Harness) -> TaskId {
    let mut task = Task::new(
        owner_identity().subject().clone(),
        TaskSeed::new("Discussed task").expect("valid seed"),
        &*harness.clock,
    );
    task.share_with(
        [EmailAddress::parse("b@y.com").expect("valid email")],
        &*harness.clock,
    );
    harness.tasks.insert(&task).await.expect("task insert");
    task.id()
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn roles_are_snapshotted_at_post_time(harness: Harness) -> eyre::Result<()> {
    let task_id = seed_shared_task(&harness).await;

    let owner_note = harness
        .service
        .add_refinement(
            Some(&owner_identity()),
            task_id,
            RefinementKind::Note,
            "kick-off note",
        )
        .await?;
    ensure!(owner_note.role() == AuthorRole::Owner);

    let collaborator_question = harness
        .service
        .add_refinement(
            Some(&collaborator_identity()),
            task_id,
            RefinementKind::Question,
            "which env does this target?",
        )
        .await?;
    ensure!(collaborator_question.role() == AuthorRole::Collaborator);
    ensure!(collaborator_question.author_email().as_str() == "b@y.com");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn strangers_cannot_post_or_read(harness: Harness) -> eyre::Result<()> {
    let task_id = seed_shared_task(&harness).await;

    let post = harness
        .service
        .add_refinement(
            Some(&stranger_identity()),
            task_id,
            RefinementKind::Note,
            "drive-by note",
        )
        .await;
    ensure!(matches!(post, Err(RefinementThreadError::NotAuthorized)));

    let read = harness
        .service
        .refinements(Some(&stranger_identity()), task_id)
        .await;
    ensure!(matches!(read, Err(RefinementThreadError::NotAuthorized)));

    let unauthenticated = harness.service.refinements(None, task_id).await?;
    ensure!(unauthenticated.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn direct_answers_are_rejected(harness: Harness) -> eyre::Result<()> {
    let task_id = seed_shared_task(&harness).await;

    let result = harness
        .service
        .add_refinement(
            Some(&owner_identity()),
            task_id,
            RefinementKind::Answer,
            "out-of-band answer",
        )
        .await;

    ensure!(matches!(
        result,
        Err(RefinementThreadError::Domain(
            RefinementDomainError::AnswerOutsideThread
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_the_owner_answers_questions(harness: Harness) -> eyre::Result<()> {
    let task_id = seed_shared_task(&harness).await;
    let question = harness
        .service
        .add_refinement(
            Some(&collaborator_identity()),
            task_id,
            RefinementKind::Question,
            "should this block the release?",
        )
        .await?;

    let by_collaborator = harness
        .service
        .answer_question(Some(&collaborator_identity()), question.id(), "yes?")
        .await;
    ensure!(matches!(
        by_collaborator,
        Err(RefinementThreadError::NotAuthorized)
    ));

    let answer = harness
        .service
        .answer_question(Some(&owner_identity()), question.id(), "no, ship it")
        .await?;
    ensure!(answer.kind() == RefinementKind::Answer);
    ensure!(answer.parent_id() == Some(question.id()));
    ensure!(answer.role() == AuthorRole::Owner);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn answering_a_note_is_rejected(harness: Harness) -> eyre::Result<()> {
    let task_id = seed_shared_task(&harness).await;
    let note = harness
        .service
        .add_refinement(
            Some(&owner_identity()),
            task_id,
            RefinementKind::Note,
            "not a question",
        )
        .await?;

    let result = harness
        .service
        .answer_question(Some(&owner_identity()), note.id(), "answering a note")
        .await;

    let Err(RefinementThreadError::Domain(RefinementDomainError::NotAQuestion(id))) = result
    else {
        bail!("expected NotAQuestion, got {result:?}");
    };
    ensure!(id == note.id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn threads_list_in_creation_order(harness: Harness) -> eyre::Result<()> {
    let task_id = seed_shared_task(&harness).await;

    for (kind, content) in [
        (RefinementKind::Note, "first"),
        (RefinementKind::Question, "second"),
        (RefinementKind::Update, "third"),
    ] {
        harness
            .service
            .add_refinement(Some(&owner_identity()), task_id, kind, content)
            .await?;
        harness.clock.advance(Duration::seconds(1));
    }

    let thread = harness
        .service
        .refinements(Some(&collaborator_identity()), task_id)
        .await?;

    let contents: Vec<&str> = thread.iter().map(|entry| entry.content()).collect();
    ensure!(contents == vec!["first", "second", "third"]);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn missing_task_is_reported(harness: Harness) -> eyre::Result<()> {
    let result = harness
        .service
        .add_refinement(
            Some(&owner_identity()),
            TaskId::new(),
            RefinementKind::Note,
            "note for nobody",
        )
        .await;

    ensure!(matches!(
        result,
        Err(RefinementThreadError::TaskNotFound(_))
    ));
    Ok(())
}
