//! `PostgreSQL` repository implementation for task lifecycle storage.

use super::{
    models::{NewSelectionRow, NewShareRow, NewTaskRow, SelectionRow, ShareRow, TaskRow},
    schema::{task_selections, task_shares, tasks},
};
use crate::identity::{EmailAddress, SubjectId};
use crate::project::domain::ProjectId;
use crate::task::{
    domain::{PersistedTaskData, Priority, Task, TaskId, TaskStatus, TrackedTime, legacy},
    ports::{TaskRepository, TaskRepositoryError, TaskRepositoryResult},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

/// `PostgreSQL` connection pool type used by task adapters.
pub type TaskPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed task repository.
#[derive(Debug, Clone)]
pub struct PostgresTaskRepository {
    pool: TaskPgPool,
}

impl From<DieselError> for TaskRepositoryError {
    fn from(err: DieselError) -> Self {
        Self::persistence(err)
    }
}

impl PostgresTaskRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: TaskPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> TaskRepositoryResult<T>
    where
        F: FnOnce(&mut PgConnection) -> TaskRepositoryResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(TaskRepositoryError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(TaskRepositoryError::persistence)?
    }
}

#[async_trait]
impl TaskRepository for PostgresTaskRepository {
    async fn insert(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = task_to_row(task);
        let share_rows = share_rows_for(task);
        let selection_rows = selection_rows_for(task);

        self.run_blocking(move |connection| {
            connection.transaction(|conn| {
                diesel::insert_into(tasks::table)
                    .values(&row)
                    .execute(conn)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            TaskRepositoryError::DuplicateTask(task_id)
                        }
                        _ => TaskRepositoryError::persistence(err),
                    })?;
                replace_relations(conn, task_id.into_inner(), &share_rows, &selection_rows)
            })
        })
        .await
    }

    async fn update(&self, task: &Task) -> TaskRepositoryResult<()> {
        let task_id = task.id();
        let row = task_to_row(task);
        let share_rows = share_rows_for(task);
        let selection_rows = selection_rows_for(task);

        self.run_blocking(move |connection| {
            connection.transaction(|conn| {
                let updated = diesel::update(tasks::table.find(task_id.into_inner()))
                    .set(&row)
                    .execute(conn)?;
                if updated == 0 {
                    return Err(TaskRepositoryError::NotFound(task_id));
                }
                replace_relations(conn, task_id.into_inner(), &share_rows, &selection_rows)
            })
        })
        .await
    }

    async fn find(&self, id: TaskId) -> TaskRepositoryResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .find(id.into_inner())
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()?;
            let Some(row) = row else {
                return Ok(None);
            };
            hydrate_rows(connection, vec![row]).map(|mut found| found.pop())
        })
        .await
    }

    async fn list_owned_by(&self, owner: &SubjectId) -> TaskRepositoryResult<Vec<Task>> {
        let owner_value = owner.as_str().to_owned();
        self.run_blocking(move |connection| {
            let rows = tasks::table
                .filter(tasks::owner_subject.eq(owner_value))
                .order(tasks::created_at.asc())
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            hydrate_rows(connection, rows)
        })
        .await
    }

    async fn list_shared_with(&self, email: &EmailAddress) -> TaskRepositoryResult<Vec<Task>> {
        let email_value = email.as_str().to_owned();
        self.run_blocking(move |connection| {
            let shared_ids = task_shares::table
                .filter(task_shares::email.eq(email_value.clone()))
                .select(task_shares::task_id);
            let mut rows = tasks::table
                .filter(tasks::id.eq_any(shared_ids))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;

            // Rows that predate the relation table are still found through
            // their legacy JSON payload.
            let legacy_pattern = format!("%\"{email_value}\"%");
            let legacy_rows = tasks::table
                .filter(tasks::shared_with_legacy.like(legacy_pattern))
                .select(TaskRow::as_select())
                .load::<TaskRow>(connection)?;
            for legacy_row in legacy_rows {
                if rows.iter().all(|row| row.id != legacy_row.id) {
                    rows.push(legacy_row);
                }
            }
            rows.sort_by_key(|row| row.created_at);

            hydrate_rows(connection, rows)
        })
        .await
    }

    async fn delete(&self, id: TaskId) -> TaskRepositoryResult<()> {
        self.run_blocking(move |connection| {
            connection.transaction(|conn| {
                diesel::delete(
                    task_shares::table.filter(task_shares::task_id.eq(id.into_inner())),
                )
                .execute(conn)?;
                diesel::delete(
                    task_selections::table.filter(task_selections::task_id.eq(id.into_inner())),
                )
                .execute(conn)?;
                let deleted = diesel::delete(tasks::table.find(id.into_inner()))
                    .execute(conn)?;
                if deleted == 0 {
                    return Err(TaskRepositoryError::NotFound(id));
                }
                Ok(())
            })
        })
        .await
    }
}

/// Replaces the relation rows for a task with a fresh snapshot.
fn replace_relations(
    connection: &mut PgConnection,
    task_id: Uuid,
    share_rows: &[NewShareRow],
    selection_rows: &[NewSelectionRow],
) -> TaskRepositoryResult<()> {
    diesel::delete(task_shares::table.filter(task_shares::task_id.eq(task_id)))
        .execute(connection)?;
    if !share_rows.is_empty() {
        diesel::insert_into(task_shares::table)
            .values(share_rows)
            .execute(connection)?;
    }
    diesel::delete(task_selections::table.filter(task_selections::task_id.eq(task_id)))
        .execute(connection)?;
    if !selection_rows.is_empty() {
        diesel::insert_into(task_selections::table)
            .values(selection_rows)
            .execute(connection)?;
    }
    Ok(())
}

/// Loads the relation rows for a batch of task rows and assembles the
/// aggregates, merging legacy JSON payloads for un-migrated rows.
fn hydrate_rows(
    connection: &mut PgConnection,
    rows: Vec<TaskRow>,
) -> TaskRepositoryResult<Vec<Task>> {
    let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

    let mut shares_by_task: HashMap<Uuid, Vec<String>> = HashMap::new();
    let share_rows = task_shares::table
        .filter(task_shares::task_id.eq_any(ids.clone()))
        .select(ShareRow::as_select())
        .load::<ShareRow>(connection)?;
    for share in share_rows {
        shares_by_task.entry(share.task_id).or_default().push(share.email);
    }

    let mut selections_by_task: HashMap<Uuid, Vec<(String, DateTime<Utc>)>> = HashMap::new();
    let selection_rows = task_selections::table
        .filter(task_selections::task_id.eq_any(ids))
        .select(SelectionRow::as_select())
        .load::<SelectionRow>(connection)?;
    for selection in selection_rows {
        selections_by_task
            .entry(selection.task_id)
            .or_default()
            .push((selection.email, selection.selected_at));
    }

    rows.into_iter()
        .map(|row| {
            let shares = shares_by_task.remove(&row.id).unwrap_or_default();
            let selections = selections_by_task.remove(&row.id).unwrap_or_default();
            row_to_task(row, shares, selections)
        })
        .collect()
}

fn task_to_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        owner_subject: task.owner().as_str().to_owned(),
        text: task.text().to_owned(),
        details: task.details().to_owned(),
        priority: task.priority().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        estimate_hours: i32::try_from(task.estimate_hours()).unwrap_or(i32::MAX),
        ref_link: task.ref_link().map(str::to_owned),
        project_id: task.project_id().map(ProjectId::into_inner),
        tracked_time_ms: task.tracked_time().as_millis(),
        started_at: task.started_at(),
        completed_at: task.completed_at(),
        analysis_data: task.analysis_data().cloned(),
        shared_with_legacy: None,
        selected_by_legacy: None,
        selected_at_legacy: None,
        created_at: task.created_at(),
        updated_at: task.updated_at(),
    }
}

fn share_rows_for(task: &Task) -> Vec<NewShareRow> {
    task.shares()
        .iter()
        .map(|email| NewShareRow {
            id: Uuid::new_v4(),
            task_id: task.id().into_inner(),
            email: email.as_str().to_owned(),
        })
        .collect()
}

fn selection_rows_for(task: &Task) -> Vec<NewSelectionRow> {
    task.selections()
        .iter()
        .map(|(email, instant)| NewSelectionRow {
            id: Uuid::new_v4(),
            task_id: task.id().into_inner(),
            email: email.as_str().to_owned(),
            selected_at: *instant,
        })
        .collect()
}

fn row_to_task(
    row: TaskRow,
    share_emails: Vec<String>,
    selection_entries: Vec<(String, DateTime<Utc>)>,
) -> TaskRepositoryResult<Task> {
    let priority =
        Priority::try_from(row.priority.as_str()).map_err(TaskRepositoryError::persistence)?;
    let status =
        TaskStatus::try_from(row.status.as_str()).map_err(TaskRepositoryError::persistence)?;
    let owner = SubjectId::new(row.owner_subject).map_err(TaskRepositoryError::persistence)?;

    // Legacy JSON payloads seed the sets; relation rows win on conflict.
    let mut shares: BTreeSet<EmailAddress> = row
        .shared_with_legacy
        .as_deref()
        .map(legacy::parse_legacy_share_list)
        .unwrap_or_default();
    shares.extend(
        share_emails
            .iter()
            .filter_map(|email| EmailAddress::parse(email.as_str()).ok()),
    );

    let mut selections: BTreeMap<EmailAddress, DateTime<Utc>> = row
        .selected_by_legacy
        .as_deref()
        .map(legacy::parse_legacy_selection_map)
        .unwrap_or_default();
    for (email, instant) in selection_entries {
        if let Ok(email) = EmailAddress::parse(email.as_str()) {
            selections.insert(email, instant);
        }
    }

    Ok(Task::from_persisted(PersistedTaskData {
        id: TaskId::from_uuid(row.id),
        owner,
        text: row.text,
        details: row.details,
        priority,
        status,
        estimate_hours: u32::try_from(row.estimate_hours).unwrap_or(0),
        ref_link: row.ref_link,
        project_id: row.project_id.map(ProjectId::from_uuid),
        tracked_time: TrackedTime::from_millis(row.tracked_time_ms),
        started_at: row.started_at,
        completed_at: row.completed_at,
        shares: shares.into_iter().collect(),
        selections: selections.into_iter().collect(),
        analysis_data: row.analysis_data,
        created_at: row.created_at,
        updated_at: row.updated_at,
    }))
}
