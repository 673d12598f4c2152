//! End-to-end collaboration flows over the in-memory adapters.
//!
//! Wires the registry, task engine, and refinement thread together the way
//! a deployment would, with a pinned clock, and drives the full
//! invite → accept → share → select → track → discuss path.

use std::sync::Arc;

use chantier::clock::FixedClock;
use chantier::identity::{EmailAddress, Identity, SubjectId};
use chantier::project::{
    adapters::memory::{InMemoryRegistry, RecordingInvitationNotifier, StaticMetricsProvider},
    domain::{CollaboratorRole, ProjectRole, ProjectSeed},
    services::ProjectRegistryService,
};
use chantier::refinement::{
    adapters::{LifecycleTaskDirectory, memory::InMemoryRefinementRepository},
    domain::RefinementKind,
    services::RefinementThreadService,
};
use chantier::task::{
    adapters::{RegistryProjectDirectory, memory::InMemoryTaskRepository},
    domain::{TaskSeed, TaskStatus},
    services::{TaskLifecycleError, TaskLifecycleService},
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use eyre::ensure;
use rstest::{fixture, rstest};

type Registry =
    ProjectRegistryService<InMemoryRegistry, FixedClock, RecordingInvitationNotifier, StaticMetricsProvider>;
type Tasks = TaskLifecycleService<
    InMemoryTaskRepository,
    RegistryProjectDirectory<InMemoryRegistry>,
    FixedClock,
>;
type Threads = RefinementThreadService<
    InMemoryRefinementRepository,
    LifecycleTaskDirectory<InMemoryTaskRepository>,
    FixedClock,
>;

struct Deployment {
    registry: Registry,
    tasks: Tasks,
    threads: Threads,
    clock: Arc<FixedClock>,
}

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn deployment() -> Deployment {
    let registry_store = Arc::new(InMemoryRegistry::new());
    let task_store = Arc::new(InMemoryTaskRepository::new());
    let clock = Arc::new(FixedClock::at(base_time()));

    let registry = ProjectRegistryService::new(
        Arc::clone(&registry_store),
        Arc::clone(&clock),
        Arc::new(RecordingInvitationNotifier::new()),
        Arc::new(StaticMetricsProvider::default()),
    );
    let tasks = TaskLifecycleService::new(
        Arc::clone(&task_store),
        Arc::new(RegistryProjectDirectory::new(registry_store)),
        Arc::clone(&clock),
    );
    let threads = RefinementThreadService::new(
        Arc::new(InMemoryRefinementRepository::new()),
        Arc::new(LifecycleTaskDirectory::new(task_store)),
        Arc::clone(&clock),
    );

    Deployment {
        registry,
        tasks,
        threads,
        clock,
    }
}

fn owner() -> Identity {
    Identity::new(SubjectId::new("subject-owner").expect("valid subject"))
        .with_email(EmailAddress::parse("owner@example.com").expect("valid email"))
        .with_name("Olive Owner")
}

fn collaborator() -> Identity {
    Identity::new(SubjectId::new("subject-collab").expect("valid subject"))
        .with_email(EmailAddress::parse("b@y.com").expect("valid email"))
        .with_name("Bao Collaborator")
}

fn stranger() -> Identity {
    Identity::new(SubjectId::new("subject-stranger").expect("valid subject"))
        .with_email(EmailAddress::parse("c@z.com").expect("valid email"))
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn full_collaboration_flow(deployment: Deployment) -> eyre::Result<()> {
    // The owner sets up a project and invites a collaborator by email.
    let project_id = deployment
        .registry
        .create_project(Some(&owner()), ProjectSeed::new("Shared Tracker")?)
        .await?;
    let invitation = deployment
        .registry
        .invite_collaborator(
            Some(&owner()),
            project_id,
            "b@y.com",
            CollaboratorRole::Collaborator,
        )
        .await?;
    deployment
        .registry
        .accept_invitation(Some(&collaborator()), invitation.token().as_str())
        .await?;

    let listings = deployment.registry.list_projects(Some(&collaborator())).await?;
    ensure!(listings.len() == 1);
    ensure!(
        listings.first().expect("listing").role
            == ProjectRole::Collaborator(CollaboratorRole::Collaborator)
    );

    // A project task is shared with every collaborator.
    let task = deployment
        .tasks
        .create_task(
            Some(&owner()),
            TaskSeed::new("Implement invitations")?.with_project(project_id),
        )
        .await?;
    let outcome = deployment
        .tasks
        .share_with_collaborators(Some(&owner()), task.id())
        .await?;
    ensure!(outcome.success);
    ensure!(outcome.added == 1);

    // The collaborator commits to the task today and tracks a run on it.
    deployment
        .tasks
        .toggle_selection(Some(&collaborator()), task.id(), true)
        .await?;
    let started = deployment
        .tasks
        .start(Some(&collaborator()), task.id())
        .await?;
    ensure!(started.status() == TaskStatus::InProgress);

    deployment.clock.advance(Duration::milliseconds(5000));
    let stopped = deployment
        .tasks
        .stop(Some(&collaborator()), task.id())
        .await?;
    ensure!(stopped.status() == TaskStatus::Todo);
    ensure!(stopped.tracked_time().as_millis() >= 5000);

    // A stranger can do none of this.
    let denied = deployment.tasks.start(Some(&stranger()), task.id()).await;
    ensure!(matches!(denied, Err(TaskLifecycleError::NotAuthorized)));

    // Refinement: the collaborator asks, the owner answers.
    let question = deployment
        .threads
        .add_refinement(
            Some(&collaborator()),
            task.id(),
            RefinementKind::Question,
            "Should declined invitations be re-sendable?",
        )
        .await?;
    deployment
        .threads
        .answer_question(Some(&owner()), question.id(), "Yes, re-inviting refreshes them.")
        .await?;

    let thread = deployment
        .threads
        .refinements(Some(&collaborator()), task.id())
        .await?;
    ensure!(thread.len() == 2);

    // Both sides see the same task, joined with the project.
    let collaborator_view = deployment.tasks.list_tasks(Some(&collaborator())).await?;
    ensure!(collaborator_view.len() == 1);
    ensure!(
        collaborator_view
            .first()
            .expect("listing")
            .project
            .as_ref()
            .map(|project| project.name.as_str())
            == Some("Shared Tracker")
    );
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn project_deletion_leaves_tolerant_dangling_references(
    deployment: Deployment,
) -> eyre::Result<()> {
    let project_id = deployment
        .registry
        .create_project(Some(&owner()), ProjectSeed::new("Doomed")?)
        .await?;
    let task = deployment
        .tasks
        .create_task(Some(&owner()), TaskSeed::new("Orphan-to-be")?.with_project(project_id))
        .await?;

    deployment
        .registry
        .delete_project(Some(&owner()), project_id)
        .await?;

    // The task survives with a dangling reference; the join yields None
    // instead of failing.
    let listings = deployment.tasks.list_tasks(Some(&owner())).await?;
    ensure!(listings.len() == 1);
    ensure!(listings.first().expect("listing").task.id() == task.id());
    ensure!(listings.first().expect("listing").project.is_none());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn selection_lapses_overnight_for_shared_tasks(
    deployment: Deployment,
) -> eyre::Result<()> {
    let project_id = deployment
        .registry
        .create_project(Some(&owner()), ProjectSeed::new("Nightly")?)
        .await?;
    let invitation = deployment
        .registry
        .invite_collaborator(
            Some(&owner()),
            project_id,
            "b@y.com",
            CollaboratorRole::Collaborator,
        )
        .await?;
    deployment
        .registry
        .accept_invitation(Some(&collaborator()), invitation.token().as_str())
        .await?;

    let task = deployment
        .tasks
        .create_task(
            Some(&owner()),
            TaskSeed::new("Daily commitment")?.with_project(project_id),
        )
        .await?;
    deployment
        .tasks
        .share_with_collaborators(Some(&owner()), task.id())
        .await?;
    deployment
        .tasks
        .toggle_selection(Some(&collaborator()), task.id(), true)
        .await?;
    deployment
        .tasks
        .start(Some(&collaborator()), task.id())
        .await?;
    deployment
        .tasks
        .stop(Some(&collaborator()), task.id())
        .await?;

    // Next day: the selection has lapsed, running requires re-selecting.
    deployment.clock.advance(Duration::days(1));
    let lapsed = deployment
        .tasks
        .start(Some(&collaborator()), task.id())
        .await;
    ensure!(matches!(lapsed, Err(TaskLifecycleError::NotSelectedToday)));

    deployment
        .tasks
        .toggle_selection(Some(&collaborator()), task.id(), true)
        .await?;
    let restarted = deployment
        .tasks
        .start(Some(&collaborator()), task.id())
        .await?;
    ensure!(restarted.status() == TaskStatus::InProgress);
    Ok(())
}
