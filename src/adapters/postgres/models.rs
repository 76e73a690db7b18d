//! Diesel row models for marketplace persistence.

use super::schema::{profiles, tasks};
use chrono::{DateTime, Utc};
use diesel::prelude::*;

/// Query result row for task records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = tasks)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct TaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task category.
    pub category: String,
    /// Lifecycle status.
    pub status: String,
    /// Poster identifier.
    pub posted_by: String,
    /// Poster display-name snapshot.
    pub posted_by_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Acceptor identifier, if accepted.
    pub accepted_by: Option<String>,
    /// Acceptor display-name snapshot, if accepted.
    pub accepted_by_name: Option<String>,
    /// Acceptance timestamp, if accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Insert model for task records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tasks)]
pub struct NewTaskRow {
    /// Task identifier.
    pub id: uuid::Uuid,
    /// Task title.
    pub title: String,
    /// Task description.
    pub description: String,
    /// Task category.
    pub category: String,
    /// Lifecycle status.
    pub status: String,
    /// Poster identifier.
    pub posted_by: String,
    /// Poster display-name snapshot.
    pub posted_by_name: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Acceptor identifier, if accepted.
    pub accepted_by: Option<String>,
    /// Acceptor display-name snapshot, if accepted.
    pub accepted_by_name: Option<String>,
    /// Acceptance timestamp, if accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Query result row for profile records.
#[derive(Debug, Clone, Queryable, QueryableByName, Selectable)]
#[diesel(table_name = profiles)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProfileRow {
    /// User identifier.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Bio.
    pub bio: String,
    /// Rating.
    pub rating: f32,
    /// Posted-task counter.
    pub tasks_posted: i64,
    /// Completed-task counter.
    pub tasks_completed: i64,
    /// Signup timestamp.
    pub created_at: DateTime<Utc>,
}

/// Insert model for profile records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = profiles)]
pub struct NewProfileRow {
    /// User identifier.
    pub uid: String,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: String,
    /// Phone number.
    pub phone: String,
    /// Bio.
    pub bio: String,
    /// Rating.
    pub rating: f32,
    /// Posted-task counter.
    pub tasks_posted: i64,
    /// Completed-task counter.
    pub tasks_completed: i64,
    /// Signup timestamp.
    pub created_at: DateTime<Utc>,
}

/// Partial update for the editable profile details; `None` fields are left
/// untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfileDetailsChangeset {
    /// New display name, if changed.
    pub name: Option<String>,
    /// New phone number, if changed.
    pub phone: Option<String>,
    /// New bio, if changed.
    pub bio: Option<String>,
}
