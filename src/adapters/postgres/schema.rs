//! Diesel schema for marketplace persistence.

diesel::table! {
    /// Task records with lifecycle status and identity snapshots.
    tasks (id) {
        /// Task identifier.
        id -> Uuid,
        /// Task title.
        #[max_length = 255]
        title -> Varchar,
        /// Task description.
        description -> Text,
        /// Task category.
        #[max_length = 50]
        category -> Varchar,
        /// Task lifecycle status.
        #[max_length = 50]
        status -> Varchar,
        /// Poster identifier from the authentication provider.
        #[max_length = 128]
        posted_by -> Varchar,
        /// Poster display-name snapshot.
        #[max_length = 255]
        posted_by_name -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Acceptor identifier, set once accepted.
        #[max_length = 128]
        accepted_by -> Nullable<Varchar>,
        /// Acceptor display-name snapshot, set once accepted.
        #[max_length = 255]
        accepted_by_name -> Nullable<Varchar>,
        /// Acceptance timestamp, set once accepted.
        accepted_at -> Nullable<Timestamptz>,
        /// Completion timestamp, set once completed.
        completed_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// User profiles with aggregate stat counters.
    profiles (uid) {
        /// User identifier from the authentication provider.
        #[max_length = 128]
        uid -> Varchar,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Email address.
        #[max_length = 255]
        email -> Varchar,
        /// Phone number (may be empty).
        #[max_length = 50]
        phone -> Varchar,
        /// Bio (may be empty).
        bio -> Text,
        /// Rating.
        rating -> Float4,
        /// Number of tasks posted.
        tasks_posted -> Int8,
        /// Number of tasks completed.
        tasks_completed -> Int8,
        /// Signup timestamp.
        created_at -> Timestamptz,
    }
}
