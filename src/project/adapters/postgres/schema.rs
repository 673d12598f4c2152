//! Diesel schema for registry persistence.

diesel::table! {
    /// Project records.
    projects (id) {
        /// Project identifier.
        id -> Uuid,
        /// Human-facing generated slug.
        #[max_length = 255]
        slug -> Varchar,
        /// Project name.
        #[max_length = 255]
        name -> Varchar,
        /// Project description.
        description -> Text,
        /// Project kind (e.g. "saas").
        #[max_length = 100]
        kind -> Varchar,
        /// Project category (e.g. "commercial").
        #[max_length = 100]
        category -> Varchar,
        /// Release status.
        #[max_length = 50]
        status -> Varchar,
        /// Optional GitHub URL.
        github_url -> Nullable<Text>,
        /// Optional derived `owner/repo` slug.
        #[max_length = 255]
        github_repo -> Nullable<Varchar>,
        /// Stargazer counter.
        github_stars -> Int8,
        /// Fork counter.
        github_forks -> Int8,
        /// Optional npm package name.
        #[max_length = 255]
        npm_package -> Nullable<Varchar>,
        /// npm download counter.
        npm_downloads -> Int8,
        /// Owner subject identifier.
        #[max_length = 255]
        owner_subject -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Collaborator membership rows, unique per `(project_id, subject)`.
    project_collaborators (id) {
        /// Row identifier.
        id -> Uuid,
        /// Project reference.
        project_id -> Uuid,
        /// Member subject identifier.
        #[max_length = 255]
        subject -> Varchar,
        /// Member email.
        #[max_length = 255]
        email -> Varchar,
        /// Granted role.
        #[max_length = 50]
        role -> Varchar,
        /// Inviter subject identifier.
        #[max_length = 255]
        added_by -> Varchar,
        /// Membership timestamp.
        added_at -> Timestamptz,
        /// Optional display name.
        #[max_length = 255]
        display_name -> Nullable<Varchar>,
    }
}

diesel::table! {
    /// Invitation rows, unique per `(project_id, email)`.
    project_invitations (id) {
        /// Row identifier.
        id -> Uuid,
        /// Project reference.
        project_id -> Uuid,
        /// Invited email.
        #[max_length = 255]
        email -> Varchar,
        /// Offered role.
        #[max_length = 50]
        role -> Varchar,
        /// Current link token.
        #[max_length = 64]
        token -> Varchar,
        /// Response status.
        #[max_length = 50]
        status -> Varchar,
        /// Inviter subject identifier.
        #[max_length = 255]
        invited_by -> Varchar,
        /// Optional inviter display name.
        #[max_length = 255]
        invited_by_name -> Nullable<Varchar>,
        /// Invitation timestamp.
        invited_at -> Timestamptz,
        /// Expiry instant.
        expires_at -> Timestamptz,
        /// Optional response timestamp.
        responded_at -> Nullable<Timestamptz>,
        /// Optional responder subject identifier.
        #[max_length = 255]
        responder_subject -> Nullable<Varchar>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(projects, project_collaborators, project_invitations);
