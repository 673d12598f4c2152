//! Diesel row models for refinement persistence.

use super::schema::task_refinements;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for refinement entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = task_refinements)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct RefinementRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Author subject identifier.
    pub author_subject: String,
    /// Author email.
    pub author_email: String,
    /// Author display name, if any.
    pub author_name: Option<String>,
    /// Author role snapshot.
    pub role: String,
    /// Entry kind.
    pub kind: String,
    /// Entry content.
    pub content: String,
    /// Question reference for answers.
    pub parent_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Edit timestamp, if any.
    pub updated_at: Option<DateTime<Utc>>,
}

/// Insert model for refinement entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = task_refinements)]
pub struct NewRefinementRow {
    /// Entry identifier.
    pub id: uuid::Uuid,
    /// Task reference.
    pub task_id: uuid::Uuid,
    /// Author subject identifier.
    pub author_subject: String,
    /// Author email.
    pub author_email: String,
    /// Author display name, if any.
    pub author_name: Option<String>,
    /// Author role snapshot.
    pub role: String,
    /// Entry kind.
    pub kind: String,
    /// Entry content.
    pub content: String,
    /// Question reference for answers.
    pub parent_id: Option<uuid::Uuid>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Edit timestamp, if any.
    pub updated_at: Option<DateTime<Utc>>,
}
