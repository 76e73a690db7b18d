//! Task aggregate root and its guarded lifecycle transitions.

use super::{TaskCategory, TaskConflict, TaskId, TaskStatus, TaskValidationError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Minimum accepted task title length after trimming.
pub const MIN_TITLE_LEN: usize = 5;

/// Display name recorded when an acceptor has no usable profile name.
const FALLBACK_ACCEPTOR_NAME: &str = "User";

/// Display name recorded when a poster has no usable profile name.
const FALLBACK_POSTER_NAME: &str = "Anonymous";

/// Validated input for posting a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDraft {
    title: String,
    description: String,
    category: TaskCategory,
    posted_by: UserId,
    posted_by_name: String,
}

impl TaskDraft {
    /// Creates a validated draft.
    ///
    /// Title and description are trimmed. An empty poster display name falls
    /// back to a generic placeholder rather than failing, matching the
    /// marketplace's tolerance for incomplete profiles.
    ///
    /// # Errors
    ///
    /// Returns [`TaskValidationError`] when the title is empty or shorter
    /// than [`MIN_TITLE_LEN`], or the description is empty.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: TaskCategory,
        posted_by: UserId,
        posted_by_name: impl Into<String>,
    ) -> Result<Self, TaskValidationError> {
        let raw_title = title.into();
        let raw_description = description.into();
        let trimmed_title = raw_title.trim();
        let trimmed_description = raw_description.trim();

        if trimmed_title.is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        let title_len = trimmed_title.chars().count();
        if title_len < MIN_TITLE_LEN {
            return Err(TaskValidationError::TitleTooShort {
                min: MIN_TITLE_LEN,
                actual: title_len,
            });
        }
        if trimmed_description.is_empty() {
            return Err(TaskValidationError::EmptyDescription);
        }

        Ok(Self {
            title: trimmed_title.to_owned(),
            description: trimmed_description.to_owned(),
            category,
            posted_by,
            posted_by_name: display_name_or(posted_by_name, FALLBACK_POSTER_NAME),
        })
    }
}

/// Task aggregate root.
///
/// Fields are private so that status, acceptor identity, and timestamps can
/// only change together through the guarded transition methods, keeping the
/// lifecycle invariants structural: `accepted_by` is set exactly when the
/// status is accepted or completed, and `completed_at` exactly when
/// completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    id: TaskId,
    title: String,
    description: String,
    category: TaskCategory,
    status: TaskStatus,
    posted_by: UserId,
    posted_by_name: String,
    created_at: DateTime<Utc>,
    accepted_by: Option<UserId>,
    accepted_by_name: Option<String>,
    accepted_at: Option<DateTime<Utc>>,
    completed_at: Option<DateTime<Utc>>,
}

/// Parameter object for reconstructing a persisted task aggregate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedTaskData {
    /// Persisted task identifier.
    pub id: TaskId,
    /// Persisted title.
    pub title: String,
    /// Persisted description.
    pub description: String,
    /// Persisted category.
    pub category: TaskCategory,
    /// Persisted lifecycle status.
    pub status: TaskStatus,
    /// Persisted poster identifier.
    pub posted_by: UserId,
    /// Persisted poster display-name snapshot.
    pub posted_by_name: String,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted acceptor identifier, if accepted.
    pub accepted_by: Option<UserId>,
    /// Persisted acceptor display-name snapshot, if accepted.
    pub accepted_by_name: Option<String>,
    /// Persisted acceptance timestamp, if accepted.
    pub accepted_at: Option<DateTime<Utc>>,
    /// Persisted completion timestamp, if completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Creates a new open task from a validated draft.
    #[must_use]
    pub fn post(draft: TaskDraft, clock: &impl Clock) -> Self {
        let TaskDraft {
            title,
            description,
            category,
            posted_by,
            posted_by_name,
        } = draft;

        Self {
            id: TaskId::new(),
            title,
            description,
            category,
            status: TaskStatus::Open,
            posted_by,
            posted_by_name,
            created_at: clock.utc(),
            accepted_by: None,
            accepted_by_name: None,
            accepted_at: None,
            completed_at: None,
        }
    }

    /// Reconstructs a task from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedTaskData) -> Self {
        Self {
            id: data.id,
            title: data.title,
            description: data.description,
            category: data.category,
            status: data.status,
            posted_by: data.posted_by,
            posted_by_name: data.posted_by_name,
            created_at: data.created_at,
            accepted_by: data.accepted_by,
            accepted_by_name: data.accepted_by_name,
            accepted_at: data.accepted_at,
            completed_at: data.completed_at,
        }
    }

    /// Returns the task identifier.
    #[must_use]
    pub const fn id(&self) -> TaskId {
        self.id
    }

    /// Returns the task title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the task description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the task category.
    #[must_use]
    pub const fn category(&self) -> TaskCategory {
        self.category
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> TaskStatus {
        self.status
    }

    /// Returns the poster identifier. Immutable after creation.
    #[must_use]
    pub const fn posted_by(&self) -> &UserId {
        &self.posted_by
    }

    /// Returns the poster display-name snapshot.
    #[must_use]
    pub fn posted_by_name(&self) -> &str {
        &self.posted_by_name
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the acceptor identifier, if the task has been accepted.
    #[must_use]
    pub const fn accepted_by(&self) -> Option<&UserId> {
        self.accepted_by.as_ref()
    }

    /// Returns the acceptor display-name snapshot, if accepted.
    #[must_use]
    pub fn accepted_by_name(&self) -> Option<&str> {
        self.accepted_by_name.as_deref()
    }

    /// Returns the acceptance timestamp, if accepted.
    #[must_use]
    pub const fn accepted_at(&self) -> Option<DateTime<Utc>> {
        self.accepted_at
    }

    /// Returns the completion timestamp, if completed.
    #[must_use]
    pub const fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Accepts the task on behalf of `accepter`.
    ///
    /// An empty acceptor display name falls back to a generic placeholder.
    ///
    /// # Errors
    ///
    /// Returns [`TaskConflict::NotOpen`] when the task is no longer open and
    /// [`TaskConflict::AlreadyAccepted`] when an acceptor is already
    /// recorded.
    pub fn accept(
        &mut self,
        accepter: UserId,
        accepter_name: impl Into<String>,
        clock: &impl Clock,
    ) -> Result<(), TaskConflict> {
        if self.status != TaskStatus::Open {
            return Err(TaskConflict::NotOpen {
                task_id: self.id,
                status: self.status,
            });
        }
        if self.accepted_by.is_some() {
            return Err(TaskConflict::AlreadyAccepted { task_id: self.id });
        }
        debug_assert!(self.status.can_transition_to(TaskStatus::Accepted));

        self.status = TaskStatus::Accepted;
        self.accepted_by = Some(accepter);
        self.accepted_by_name = Some(display_name_or(accepter_name, FALLBACK_ACCEPTOR_NAME));
        self.accepted_at = Some(clock.utc());
        Ok(())
    }

    /// Completes the task on behalf of its acceptor.
    ///
    /// # Errors
    ///
    /// Returns [`TaskConflict::NotAccepted`] when the task is not in the
    /// accepted state and [`TaskConflict::NotAcceptor`] when `accepter` is
    /// not the recorded acceptor.
    pub fn complete(&mut self, accepter: &UserId, clock: &impl Clock) -> Result<(), TaskConflict> {
        if self.status != TaskStatus::Accepted {
            return Err(TaskConflict::NotAccepted {
                task_id: self.id,
                status: self.status,
            });
        }
        if self.accepted_by.as_ref() != Some(accepter) {
            return Err(TaskConflict::NotAcceptor { task_id: self.id });
        }
        debug_assert!(self.status.can_transition_to(TaskStatus::Completed));

        self.status = TaskStatus::Completed;
        self.completed_at = Some(clock.utc());
        Ok(())
    }

    /// Cancels the task on behalf of its poster.
    ///
    /// Only open tasks may be cancelled, and only by the user who posted
    /// them. Cancellation is a terminal status, not deletion.
    ///
    /// # Errors
    ///
    /// Returns [`TaskConflict::NotOpen`] when the task is no longer open and
    /// [`TaskConflict::NotPoster`] when `requester` did not post the task.
    pub fn cancel(&mut self, requester: &UserId) -> Result<(), TaskConflict> {
        if self.status != TaskStatus::Open {
            return Err(TaskConflict::NotOpen {
                task_id: self.id,
                status: self.status,
            });
        }
        if &self.posted_by != requester {
            return Err(TaskConflict::NotPoster { task_id: self.id });
        }
        debug_assert!(self.status.can_transition_to(TaskStatus::Cancelled));

        self.status = TaskStatus::Cancelled;
        Ok(())
    }
}

/// Returns the trimmed name, or the fallback when it is empty.
fn display_name_or(name: impl Into<String>, fallback: &str) -> String {
    let raw = name.into();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        fallback.to_owned()
    } else {
        trimmed.to_owned()
    }
}
