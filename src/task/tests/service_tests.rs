//! Service orchestration tests for the task lifecycle over the in-memory
//! repository and a mocked registry directory.

use std::sync::Arc;

use crate::clock::FixedClock;
use crate::identity::{EmailAddress, Identity, SubjectId};
use crate::patch::FieldPatch;
use crate::project::domain::{ProjectId, ProjectStatus};
use crate::task::{
    adapters::memory::InMemoryTaskRepository,
    domain::{Priority, TaskSeed, TaskStatus, TaskUpdate},
    ports::{ProjectSummary, TaskRepository, directory::MockProjectDirectory},
    services::{ExtractedTaskCandidate, TaskLifecycleError, TaskLifecycleService},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use eyre::{bail, ensure};
use rstest::{fixture, rstest};
use serde_json::json;

type TestService = TaskLifecycleService<InMemoryTaskRepository, MockProjectDirectory, FixedClock>;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn repository() -> Arc<InMemoryTaskRepository> {
    Arc::new(InMemoryTaskRepository::new())
}

#[fixture]
fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(base_time()))
}

fn service_with(
    repository: &Arc<InMemoryTaskRepository>,
    directory: MockProjectDirectory,
    clock: &Arc<FixedClock>,
) -> TestService {
    TaskLifecycleService::new(Arc::clone(repository), Arc::new(directory), Arc::clone(clock))
}

fn owner_identity() -> Identity {
    Identity::new(SubjectId::new("subject-owner").expect("valid subject"))
        .with_email(EmailAddress::parse("owner@example.com").expect("valid email"))
}

fn collaborator_identity() -> Identity {
    Identity::new(SubjectId::new("subject-collab").expect("valid subject"))
        .with_email(EmailAddress::parse("b@y.com").expect("valid email"))
}

fn stranger_identity() -> Identity {
    Identity::new(SubjectId::new("subject-stranger").expect("valid subject"))
        .with_email(EmailAddress::parse("c@z.com").expect("valid email"))
}

fn collaborator_emails() -> Vec<EmailAddress> {
    vec![
        EmailAddress::parse("b@y.com").expect("valid email"),
        EmailAddress::parse("owner@example.com").expect("valid email"),
    ]
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_and_stop_accumulate_elapsed_time(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let service = service_with(&repository, MockProjectDirectory::new(), &clock);
    let owner = owner_identity();
    let task = service
        .create_task(Some(&owner), TaskSeed::new("Track me")?)
        .await?;

    let started = service.start(Some(&owner), task.id()).await?;
    ensure!(started.status() == TaskStatus::InProgress);
    ensure!(started.started_at() == Some(base_time()));

    clock.advance(Duration::milliseconds(5000));
    let stopped = service.stop(Some(&owner), task.id()).await?;

    ensure!(stopped.status() == TaskStatus::Todo);
    ensure!(stopped.started_at().is_none());
    ensure!(stopped.tracked_time().as_millis() >= 5000);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn double_start_surfaces_already_running(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let service = service_with(&repository, MockProjectDirectory::new(), &clock);
    let owner = owner_identity();
    let task = service
        .create_task(Some(&owner), TaskSeed::new("Track me")?)
        .await?;
    service.start(Some(&owner), task.id()).await?;

    let result = service.start(Some(&owner), task.id()).await;

    ensure!(matches!(
        result,
        Err(TaskLifecycleError::Domain(
            crate::task::domain::TaskDomainError::AlreadyRunning(_)
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selection_gates_collaborator_runs(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let mut directory = MockProjectDirectory::new();
    directory
        .expect_collaborator_emails()
        .returning(|_| Ok(collaborator_emails()));
    let service = service_with(&repository, directory, &clock);
    let owner = owner_identity();
    let collaborator = collaborator_identity();

    let project_id = ProjectId::new();
    let task = service
        .create_task(
            Some(&owner),
            TaskSeed::new("Shared work")?.with_project(project_id),
        )
        .await?;
    service
        .share_with_collaborators(Some(&owner), task.id())
        .await?;

    // Shared but unselected: recoverable precondition failure.
    let unselected = service.start(Some(&collaborator), task.id()).await;
    ensure!(matches!(
        unselected,
        Err(TaskLifecycleError::NotSelectedToday)
    ));

    service
        .toggle_selection(Some(&collaborator), task.id(), true)
        .await?;
    let started = service.start(Some(&collaborator), task.id()).await?;
    ensure!(started.status() == TaskStatus::InProgress);

    // A stranger is rejected outright.
    let stranger = service.stop(Some(&stranger_identity()), task.id()).await;
    ensure!(matches!(stranger, Err(TaskLifecycleError::NotAuthorized)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_day_reselection_is_a_no_op(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let mut directory = MockProjectDirectory::new();
    directory
        .expect_collaborator_emails()
        .returning(|_| Ok(collaborator_emails()));
    let service = service_with(&repository, directory, &clock);
    let owner = owner_identity();
    let collaborator = collaborator_identity();

    let task = service
        .create_task(
            Some(&owner),
            TaskSeed::new("Shared work")?.with_project(ProjectId::new()),
        )
        .await?;
    service
        .share_with_collaborators(Some(&owner), task.id())
        .await?;

    let first = service
        .toggle_selection(Some(&collaborator), task.id(), true)
        .await?;
    let email = EmailAddress::parse("b@y.com")?;
    let first_instant = first.selections().instant_for(&email);

    clock.advance(Duration::minutes(30));
    let second = service
        .toggle_selection(Some(&collaborator), task.id(), true)
        .await?;

    ensure!(second.selections().instant_for(&email) == first_instant);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn toggle_selection_requires_an_email(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let service = service_with(&repository, MockProjectDirectory::new(), &clock);
    let owner = owner_identity();
    let task = service
        .create_task(Some(&owner), TaskSeed::new("Private work")?)
        .await?;

    let email_less = Identity::new(SubjectId::new("subject-owner")?);
    let result = service
        .toggle_selection(Some(&email_less), task.id(), true)
        .await;

    ensure!(matches!(result, Err(TaskLifecycleError::EmailRequired)));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sharing_requires_a_linked_project(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let service = service_with(&repository, MockProjectDirectory::new(), &clock);
    let owner = owner_identity();
    let task = service
        .create_task(Some(&owner), TaskSeed::new("Projectless")?)
        .await?;

    let result = service
        .share_with_collaborators(Some(&owner), task.id())
        .await;

    let Err(TaskLifecycleError::NoProject(id)) = result else {
        bail!("expected NoProject, got {result:?}");
    };
    ensure!(id == task.id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sharing_with_no_collaborators_reports_failure_without_throwing(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let mut directory = MockProjectDirectory::new();
    directory.expect_collaborator_emails().returning(|_| Ok(Vec::new()));
    let service = service_with(&repository, directory, &clock);
    let owner = owner_identity();
    let task = service
        .create_task(
            Some(&owner),
            TaskSeed::new("Lonely project")?.with_project(ProjectId::new()),
        )
        .await?;

    let outcome = service
        .share_with_collaborators(Some(&owner), task.id())
        .await?;

    ensure!(!outcome.success);
    ensure!(outcome.added == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn sharing_is_additive_and_excludes_the_owner(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let mut directory = MockProjectDirectory::new();
    directory
        .expect_collaborator_emails()
        .returning(|_| Ok(collaborator_emails()));
    let service = service_with(&repository, directory, &clock);
    let owner = owner_identity();
    let task = service
        .create_task(
            Some(&owner),
            TaskSeed::new("Shared work")?.with_project(ProjectId::new()),
        )
        .await?;

    let first = service
        .share_with_collaborators(Some(&owner), task.id())
        .await?;
    ensure!(first.success);
    ensure!(first.added == 1);
    ensure!(first.total == 1);

    // Already fully shared: still a success, nothing new added.
    let second = service
        .share_with_collaborators(Some(&owner), task.id())
        .await?;
    ensure!(second.success);
    ensure!(second.added == 0);
    ensure!(second.total == 1);

    let stored = repository
        .find(task.id())
        .await?
        .expect("task persists");
    ensure!(!stored.shares().contains(&EmailAddress::parse("owner@example.com")?));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unshare_clears_the_whole_share_set(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let mut directory = MockProjectDirectory::new();
    directory
        .expect_collaborator_emails()
        .returning(|_| Ok(collaborator_emails()));
    let service = service_with(&repository, directory, &clock);
    let owner = owner_identity();
    let task = service
        .create_task(
            Some(&owner),
            TaskSeed::new("Shared work")?.with_project(ProjectId::new()),
        )
        .await?;
    service
        .share_with_collaborators(Some(&owner), task.id())
        .await?;

    let unshared = service.unshare(Some(&owner), task.id()).await?;

    ensure!(unshared.shares().is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn share_members_may_edit_but_not_delete(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let mut directory = MockProjectDirectory::new();
    directory
        .expect_collaborator_emails()
        .returning(|_| Ok(collaborator_emails()));
    let service = service_with(&repository, directory, &clock);
    let owner = owner_identity();
    let collaborator = collaborator_identity();
    let task = service
        .create_task(
            Some(&owner),
            TaskSeed::new("Shared work")?.with_project(ProjectId::new()),
        )
        .await?;
    service
        .share_with_collaborators(Some(&owner), task.id())
        .await?;

    let edited = service
        .update_task(
            Some(&collaborator),
            task.id(),
            TaskUpdate::new()
                .details("collaborator notes")
                .priority(Priority::High),
        )
        .await?;
    ensure!(edited.details() == "collaborator notes");
    ensure!(edited.priority() == Priority::High);

    let delete = service.delete_task(Some(&collaborator), task.id()).await;
    ensure!(matches!(delete, Err(TaskLifecycleError::NotAuthorized)));

    let stranger_edit = service
        .update_task(
            Some(&stranger_identity()),
            task.id(),
            TaskUpdate::new().text("hijack"),
        )
        .await;
    ensure!(matches!(
        stranger_edit,
        Err(TaskLifecycleError::NotAuthorized)
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn update_distinguishes_clearing_from_keeping(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let service = service_with(&repository, MockProjectDirectory::new(), &clock);
    let owner = owner_identity();
    let task = service
        .create_task(
            Some(&owner),
            TaskSeed::new("Linked")?.with_ref_link("https://issue/42"),
        )
        .await?;

    let untouched = service
        .update_task(Some(&owner), task.id(), TaskUpdate::new().text("Renamed"))
        .await?;
    ensure!(untouched.ref_link() == Some("https://issue/42"));

    let cleared = service
        .update_task(
            Some(&owner),
            task.id(),
            TaskUpdate::new().ref_link(FieldPatch::Clear),
        )
        .await?;
    ensure!(cleared.ref_link().is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn listing_joins_projects_tolerantly(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let live_project = ProjectId::new();
    let deleted_project = ProjectId::new();
    let mut directory = MockProjectDirectory::new();
    directory.expect_project_summary().returning(move |id| {
        if id == live_project {
            Ok(Some(ProjectSummary {
                id,
                name: "Alive".to_owned(),
                status: ProjectStatus::Development,
            }))
        } else {
            Ok(None)
        }
    });
    let service = service_with(&repository, directory, &clock);
    let owner = owner_identity();

    service
        .create_task(Some(&owner), TaskSeed::new("Linked")?.with_project(live_project))
        .await?;
    service
        .create_task(
            Some(&owner),
            TaskSeed::new("Dangling")?.with_project(deleted_project),
        )
        .await?;
    service.create_task(Some(&owner), TaskSeed::new("Private")?).await?;

    let listings = service.list_tasks(Some(&owner)).await?;

    ensure!(listings.len() == 3);
    let by_text = |text: &str| {
        listings
            .iter()
            .find(|listing| listing.task.text() == text)
            .expect("listing present")
    };
    ensure!(by_text("Linked").project.as_ref().map(|p| p.name.as_str()) == Some("Alive"));
    ensure!(by_text("Dangling").project.is_none());
    ensure!(by_text("Private").project.is_none());

    let unauthenticated = service.list_tasks(None).await?;
    ensure!(unauthenticated.is_empty());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn import_creates_a_task_per_accepted_candidate(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let service = service_with(&repository, MockProjectDirectory::new(), &clock);
    let owner = owner_identity();

    let imported = service
        .import_extracted_tasks(
            Some(&owner),
            vec![
                ExtractedTaskCandidate::new("Fix login flow")
                    .with_description("Seen on the whiteboard photo")
                    .with_priority(Priority::High)
                    .with_estimate_hours(3)
                    .with_analysis(json!({"confidence": 0.92})),
                ExtractedTaskCandidate::new("Update changelog"),
            ],
        )
        .await?;

    ensure!(imported.len() == 2);
    let first = imported.first().expect("first import");
    ensure!(first.text() == "Fix login flow");
    ensure!(first.priority() == Priority::High);
    ensure!(first.estimate_hours() == 3);
    ensure!(first.analysis_data().is_some());
    let second = imported.get(1).expect("second import");
    ensure!(second.estimate_hours() == 1);

    let listings = service.list_tasks(Some(&owner)).await?;
    ensure!(listings.len() == 2);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reset_timer_is_owner_only(
    repository: Arc<InMemoryTaskRepository>,
    clock: Arc<FixedClock>,
) -> eyre::Result<()> {
    let service = service_with(&repository, MockProjectDirectory::new(), &clock);
    let owner = owner_identity();
    let task = service
        .create_task(Some(&owner), TaskSeed::new("Track me")?)
        .await?;
    service.start(Some(&owner), task.id()).await?;
    clock.advance(Duration::seconds(30));
    service.stop(Some(&owner), task.id()).await?;

    let denied = service
        .reset_timer(Some(&stranger_identity()), task.id())
        .await;
    ensure!(matches!(denied, Err(TaskLifecycleError::NotAuthorized)));

    let reset = service.reset_timer(Some(&owner), task.id()).await?;
    ensure!(reset.tracked_time().as_millis() == 0);
    Ok(())
}
