//! Diesel row models for task persistence.

use super::schema::{task_selections, task_shares, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owner subject identifier.
    pub owner_subject: String,
    /// Task text.
    pub text: String,
    /// Task details.
    pub details: String,
    /// Priority.
    pub priority: String,
    /// Lifecycle status.
    pub status: String,
    /// Whole-hour effort estimate.
    pub estimate_hours: i32,
    /// Optional reference link.
    pub ref_link: Option<String>,
    /// Optional project reference.
    pub project_id: Option<uuid::Uuid>,
    /// Accumulated tracked time in milliseconds.
    pub tracked_time_ms: i64,
    /// Running-timer start.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Opaque analysis payload.
    pub analysis_data: Option<Value>,
    /// Legacy JSON share list.
    pub shared_with_legacy: Option<String>,
    /// Legacy JSON selection map.
    pub selected_by_legacy: Option<String>,
    /// Legacy single-selection timestamp.
    pub selected_at_legacy: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insert and update model for task records.
///
/// The legacy columns are always written as `NULL`: any write through the
/// current schema completes the row's migration to the relation tables.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = tasks)]
#[diesel(treat_none_as_null = true)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Owner subject identifier.
    pub owner_subject: String,
    /// Task text.
    pub text: String,
    /// Task details.
    pub details: String,
    /// Priority.
    pub priority: String,
    /// Lifecycle status.
    pub status: String,
    /// Whole-hour effort estimate.
    pub estimate_hours: i32,
    /// Optional reference link.
    pub ref_link: Option<String>,
    /// Optional project reference.
    pub project_id: Option<uuid::Uuid>,
    /// Accumulated tracked time in milliseconds.
    pub tracked_time_ms: i64,
    /// Running-timer start.
    pub started_at: Option<DateTime<Utc>>,
    /// Completion timestamp.
    pub completed_at: Option<DateTime<Utc>>,
    /// Opaque analysis payload.
    pub analysis_data: Option<Value>,
    /// Legacy JSON share list, cleared on write.
    pub shared_with_legacy: Option<String>,
    /// Legacy JSON selection map, cleared on write.
    pub selected_by_legacy: Option<String>,
    /// Legacy single-selection timestamp, cleared on write.
    pub selected_at_legacy: Option<DateTime<Utc>>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Query result row for share relation records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_shares)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ShareRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Shared email.
    pub email: String,
}

/// Insert model for share relation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_shares)]
pub struct NewShareRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Shared email.
    pub email: String,
}

/// Query result row for selection relation records.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_selections)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct SelectionRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Selecting email.
    pub email: String,
    /// Selection instant.
    pub selected_at: DateTime<Utc>,
}

/// Insert model for selection relation records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_selections)]
pub struct NewSelectionRow {
    /// Row identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Selecting email.
    pub email: String,
    /// Selection instant.
    pub selected_at: DateTime<Utc>,
}
