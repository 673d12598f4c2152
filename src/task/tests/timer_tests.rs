//! Unit tests for the timer state machine and time accumulation.

use crate::clock::FixedClock;
use crate::identity::SubjectId;
use crate::task::domain::{Task, TaskDomainError, TaskSeed, TaskStatus, TaskUpdate, TrackedTime};
use chrono::{DateTime, Duration, TimeZone, Utc};
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

fn owner() -> SubjectId {
    SubjectId::new("subject-owner").expect("valid subject")
}

#[fixture]
fn task(clock: FixedClock) -> Task {
    Task::new(
        owner(),
        TaskSeed::new("Wire up the timer").expect("valid seed"),
        &clock,
    )
}

/// The invariant every sequence below re-checks: a task is in progress
/// exactly when a run start is recorded.
fn running_invariant_holds(task: &Task) -> bool {
    (task.status() == TaskStatus::InProgress) == task.started_at().is_some()
}

#[rstest]
fn new_task_is_idle_todo(task: Task) -> eyre::Result<()> {
    ensure!(task.status() == TaskStatus::Todo);
    ensure!(task.started_at().is_none());
    ensure!(task.completed_at().is_none());
    ensure!(task.tracked_time() == TrackedTime::ZERO);
    ensure!(running_invariant_holds(&task));
    Ok(())
}

#[rstest]
fn start_then_stop_accumulates_the_run(clock: FixedClock, mut task: Task) -> eyre::Result<()> {
    task.start(&clock)?;
    ensure!(task.status() == TaskStatus::InProgress);
    ensure!(task.started_at() == Some(base_time()));
    ensure!(running_invariant_holds(&task));

    clock.advance(Duration::milliseconds(5000));
    task.stop(&clock);

    ensure!(task.status() == TaskStatus::Todo);
    ensure!(task.started_at().is_none());
    ensure!(task.tracked_time().as_millis() >= 5000);
    ensure!(running_invariant_holds(&task));
    Ok(())
}

#[rstest]
fn double_start_is_rejected(clock: FixedClock, mut task: Task) -> eyre::Result<()> {
    task.start(&clock)?;

    let result = task.start(&clock);
    let expected = Err(TaskDomainError::AlreadyRunning(task.id()));
    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(task.started_at() == Some(base_time()));
    Ok(())
}

#[rstest]
fn complete_while_running_accumulates_and_stamps_completion(
    clock: FixedClock,
    mut task: Task,
) -> eyre::Result<()> {
    task.start(&clock)?;
    clock.advance(Duration::seconds(90));

    task.complete(&clock);

    ensure!(task.status() == TaskStatus::Done);
    ensure!(task.started_at().is_none());
    ensure!(task.completed_at() == Some(base_time() + Duration::seconds(90)));
    ensure!(task.tracked_time().as_millis() == 90_000);
    ensure!(running_invariant_holds(&task));
    Ok(())
}

#[rstest]
fn complete_from_todo_keeps_existing_tracked_time(
    clock: FixedClock,
    mut task: Task,
) -> eyre::Result<()> {
    task.start(&clock)?;
    clock.advance(Duration::seconds(10));
    task.stop(&clock);
    let tracked_after_stop = task.tracked_time();

    clock.advance(Duration::seconds(30));
    task.complete(&clock);

    ensure!(task.status() == TaskStatus::Done);
    ensure!(task.tracked_time() == tracked_after_stop);
    Ok(())
}

#[rstest]
fn tracked_time_equals_the_sum_of_run_durations(
    clock: FixedClock,
    mut task: Task,
) -> eyre::Result<()> {
    for run_seconds in [5_i64, 25, 120] {
        task.start(&clock)?;
        clock.advance(Duration::seconds(run_seconds));
        task.stop(&clock);
        ensure!(running_invariant_holds(&task));
    }

    ensure!(task.tracked_time().as_millis() == (5 + 25 + 120) * 1000);
    Ok(())
}

#[rstest]
fn backwards_clock_never_shrinks_tracked_time(
    clock: FixedClock,
    mut task: Task,
) -> eyre::Result<()> {
    task.start(&clock)?;
    clock.advance(Duration::seconds(60));
    task.stop(&clock);
    let tracked_before_skew = task.tracked_time();

    task.start(&clock)?;
    clock.advance(Duration::seconds(-45));
    task.stop(&clock);

    ensure!(task.tracked_time() == tracked_before_skew);
    ensure!(running_invariant_holds(&task));
    Ok(())
}

#[rstest]
fn reopen_returns_to_todo_without_restoring_the_timer(
    clock: FixedClock,
    mut task: Task,
) -> eyre::Result<()> {
    task.start(&clock)?;
    clock.advance(Duration::seconds(40));
    task.complete(&clock);
    let tracked_when_done = task.tracked_time();

    task.reopen(&clock);

    ensure!(task.status() == TaskStatus::Todo);
    ensure!(task.started_at().is_none());
    ensure!(task.completed_at().is_none());
    ensure!(task.tracked_time() == tracked_when_done);
    ensure!(running_invariant_holds(&task));
    Ok(())
}

#[rstest]
fn reset_zeroes_tracked_time(clock: FixedClock, mut task: Task) -> eyre::Result<()> {
    task.start(&clock)?;
    clock.advance(Duration::seconds(15));
    task.stop(&clock);
    ensure!(task.tracked_time().as_millis() > 0);

    task.reset_tracked_time(&clock);

    ensure!(task.tracked_time() == TrackedTime::ZERO);
    Ok(())
}

#[rstest]
fn status_update_through_the_generic_path_keeps_the_invariant(
    clock: FixedClock,
    mut task: Task,
) -> eyre::Result<()> {
    task.apply_update(TaskUpdate::new().status(TaskStatus::InProgress), &clock);
    ensure!(running_invariant_holds(&task));

    clock.advance(Duration::seconds(20));
    task.apply_update(TaskUpdate::new().status(TaskStatus::Todo), &clock);
    ensure!(running_invariant_holds(&task));
    ensure!(task.tracked_time().as_millis() == 20_000);

    task.apply_update(TaskUpdate::new().status(TaskStatus::Done), &clock);
    ensure!(task.completed_at().is_some());

    task.apply_update(TaskUpdate::new().status(TaskStatus::Todo), &clock);
    ensure!(task.completed_at().is_none());
    ensure!(running_invariant_holds(&task));
    Ok(())
}

#[rstest]
fn tracked_time_clamps_negative_persisted_values() {
    assert_eq!(TrackedTime::from_millis(-500), TrackedTime::ZERO);
    assert_eq!(TrackedTime::from_millis(500).as_millis(), 500);
}
