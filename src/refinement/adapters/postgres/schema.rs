//! Diesel schema for refinement thread persistence.

diesel::table! {
    /// Refinement thread entries.
    task_refinements (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Task reference.
        task_id -> Uuid,
        /// Author subject identifier.
        #[max_length = 255]
        author_subject -> Varchar,
        /// Author email at post time.
        #[max_length = 255]
        author_email -> Varchar,
        /// Author display name at post time.
        #[max_length = 255]
        author_name -> Nullable<Varchar>,
        /// Author role snapshot.
        #[max_length = 50]
        role -> Varchar,
        /// Entry kind.
        #[max_length = 50]
        kind -> Varchar,
        /// Entry content.
        content -> Text,
        /// Question reference for answers.
        parent_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Edit timestamp.
        updated_at -> Nullable<Timestamptz>,
    }
}
