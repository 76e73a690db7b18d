//! Error types for marketplace domain validation and guarded transitions.

use super::{TaskId, TaskStatus};
use thiserror::Error;

/// Errors caught while validating task input, before any store call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskValidationError {
    /// The task title is empty after trimming.
    #[error("task title must not be empty")]
    EmptyTitle,

    /// The task title is shorter than the published minimum.
    #[error("task title too short: {actual} characters, minimum {min}")]
    TitleTooShort {
        /// Minimum accepted title length.
        min: usize,
        /// Length of the rejected title after trimming.
        actual: usize,
    },

    /// The task description is empty after trimming.
    #[error("task description must not be empty")]
    EmptyDescription,
}

/// A lifecycle transition attempted against a precondition that no longer
/// holds. Terminal for the calling operation; the caller must re-fetch and
/// re-decide rather than retry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TaskConflict {
    /// The task is not open, so it cannot be accepted or cancelled.
    #[error("task {task_id} is not open (status: {status})")]
    NotOpen {
        /// Identifier of the contested task.
        task_id: TaskId,
        /// Status observed inside the transaction.
        status: TaskStatus,
    },

    /// Another user accepted the task first.
    #[error("task {task_id} has already been accepted")]
    AlreadyAccepted {
        /// Identifier of the contested task.
        task_id: TaskId,
    },

    /// The task is not in the accepted state, so it cannot be completed.
    #[error("task {task_id} is not accepted yet (status: {status})")]
    NotAccepted {
        /// Identifier of the contested task.
        task_id: TaskId,
        /// Status observed inside the transaction.
        status: TaskStatus,
    },

    /// A user other than the acceptor attempted to complete the task.
    #[error("task {task_id} was accepted by a different user")]
    NotAcceptor {
        /// Identifier of the contested task.
        task_id: TaskId,
    },

    /// A user other than the poster attempted to cancel the task.
    #[error("only the poster may cancel task {task_id}")]
    NotPoster {
        /// Identifier of the contested task.
        task_id: TaskId,
    },
}

/// Errors caught while validating profile input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProfileValidationError {
    /// The display name is empty after trimming.
    #[error("profile name must not be empty")]
    EmptyName,

    /// The email address is empty after trimming.
    #[error("profile email must not be empty")]
    EmptyEmail,
}

/// Error returned when a user identifier is empty.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("user id must not be empty")]
pub struct InvalidUserId;

/// Error returned while parsing task statuses from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task status: {0}")]
pub struct ParseStatusError(pub String);

/// Error returned while parsing task categories from persistence.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown task category: {0}")]
pub struct ParseCategoryError(pub String);
