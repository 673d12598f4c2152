//! Diesel schema for task lifecycle persistence.
//!
//! Shares and selections live in relation tables; the `*_legacy` columns
//! on `tasks` carry the old JSON payloads for rows that predate the
//! relational schema and are cleared whenever a task is written.

diesel::table! {
    /// Task records.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Owner subject identifier.
        #[max_length = 255]
        owner_subject -> Varchar,
        /// Task text.
        text -> Text,
        /// Task details.
        details -> Text,
        /// Priority.
        #[max_length = 50]
        priority -> Varchar,
        /// Lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Whole-hour effort estimate.
        estimate_hours -> Int4,
        /// Optional reference link.
        ref_link -> Nullable<Text>,
        /// Optional project reference.
        project_id -> Nullable<Uuid>,
        /// Accumulated tracked time in milliseconds.
        tracked_time_ms -> Int8,
        /// Running-timer start, when a run is in progress.
        started_at -> Nullable<Timestamptz>,
        /// Completion timestamp.
        completed_at -> Nullable<Timestamptz>,
        /// Opaque analysis payload the task was extracted from.
        analysis_data -> Nullable<Jsonb>,
        /// Legacy JSON share list, pending migration.
        shared_with_legacy -> Nullable<Text>,
        /// Legacy JSON selection map, pending migration.
        selected_by_legacy -> Nullable<Text>,
        /// Legacy single-selection timestamp, pending migration.
        selected_at_legacy -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Share relation rows, unique per `(task_id, email)`.
    task_shares (id) {
        /// Row identifier.
        id -> Uuid,
        /// Task reference.
        task_id -> Uuid,
        /// Shared email.
        #[max_length = 255]
        email -> Varchar,
    }
}

diesel::table! {
    /// Selection relation rows, unique per `(task_id, email)`.
    task_selections (id) {
        /// Row identifier.
        id -> Uuid,
        /// Task reference.
        task_id -> Uuid,
        /// Selecting email.
        #[max_length = 255]
        email -> Varchar,
        /// Selection instant.
        selected_at -> Timestamptz,
    }
}

diesel::joinable!(task_shares -> tasks (task_id));
diesel::joinable!(task_selections -> tasks (task_id));
diesel::allow_tables_to_appear_in_same_query!(tasks, task_shares, task_selections);
