//! Store port: the document-database abstraction the core depends on.
//!
//! The port captures the capabilities the marketplace needs from a hosted
//! document store: per-document reads, conditional transactional updates,
//! commutative counter increments, and push-based change streams. Any
//! backend with conflict-detecting read-modify-write semantics can satisfy
//! it, including a relational store with row-level locking.

use crate::domain::{ProfileUpdate, StatDelta, Task, TaskConflict, TaskId, UserId, UserProfile};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Writes produced by a task transaction: the updated task plus any stat
/// counter increments to apply in the same atomic unit.
#[derive(Debug, Clone)]
pub struct TaskWrites {
    /// The task as it must be persisted.
    pub task: Task,
    /// Counter increments applied with the task write, both-or-neither.
    pub stats: Vec<StatDelta>,
}

impl TaskWrites {
    /// Writes that update the task without touching any counter.
    #[must_use]
    pub const fn task_only(task: Task) -> Self {
        Self {
            task,
            stats: Vec::new(),
        }
    }
}

/// Decision function run inside a task transaction.
///
/// The store invokes it with the current task snapshot inside one atomic
/// read-modify-write. Returning a [`TaskConflict`] aborts the transaction
/// without writing; the conflict is surfaced to the caller unchanged.
pub type TaskDecision = Arc<dyn Fn(&Task) -> Result<TaskWrites, TaskConflict> + Send + Sync>;

/// Change stream over the task collection.
///
/// Carries the full collection ordered by creation time descending, with
/// at-least-once delivery of the latest snapshot on any underlying change.
/// Dropping the receiver releases the subscription; re-subscribing replaces
/// (drops) the prior handle.
pub type TaskWatch = watch::Receiver<Vec<Task>>;

/// Change stream over a single user profile. `None` until the profile
/// exists. Same release semantics as [`TaskWatch`].
pub type ProfileWatch = watch::Receiver<Option<UserProfile>>;

/// Document-store contract consumed by the marketplace services.
#[async_trait]
pub trait MarketplaceStore: Send + Sync {
    /// Creates a task and applies the given counter increments in one atomic
    /// unit.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateTask`] when the identifier already
    /// exists and [`StoreError::ProfileNotFound`] when a delta references an
    /// unknown profile; in either case nothing is written.
    async fn insert_task(&self, task: &Task, stats: &[StatDelta]) -> StoreResult<()>;

    /// Reads a task by identifier. Returns `None` when absent.
    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>>;

    /// Runs `decide` against the current task inside one atomic
    /// read-modify-write and applies the returned writes.
    ///
    /// Implementations must be linearizable against concurrent transactions
    /// on the same task: of two racing accept attempts exactly one observes
    /// the open task, the other observes the accepted one.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::TaskNotFound`] when the task does not exist,
    /// [`StoreError::Conflict`] when `decide` rejects the observed state,
    /// and [`StoreError::Aborted`] when the backend detects a transaction
    /// conflict (safe to retry).
    async fn transact_task(&self, id: TaskId, decide: TaskDecision) -> StoreResult<Task>;

    /// Subscribes to the task collection change stream.
    async fn watch_tasks(&self) -> StoreResult<TaskWatch>;

    /// Creates a profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateProfile`] when the user is already
    /// registered.
    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<()>;

    /// Reads a profile by user identifier. Returns `None` when absent.
    async fn get_profile(&self, uid: &UserId) -> StoreResult<Option<UserProfile>>;

    /// Applies an editable-details patch and returns the updated profile.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProfileNotFound`] when the profile does not
    /// exist.
    async fn update_profile(&self, uid: &UserId, update: ProfileUpdate)
        -> StoreResult<UserProfile>;

    /// Applies a commutative counter increment.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ProfileNotFound`] when the profile does not
    /// exist.
    async fn increment_stat(&self, delta: &StatDelta) -> StoreResult<()>;

    /// Subscribes to a single profile's change stream.
    async fn watch_profile(&self, uid: &UserId) -> StoreResult<ProfileWatch>;
}

/// Errors returned by store implementations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The referenced profile does not exist.
    #[error("profile not found: {0}")]
    ProfileNotFound(UserId),

    /// A task with the same identifier already exists.
    #[error("duplicate task identifier: {0}")]
    DuplicateTask(TaskId),

    /// A profile for the user already exists.
    #[error("duplicate profile: {0}")]
    DuplicateProfile(UserId),

    /// A transaction decision rejected the observed state.
    #[error(transparent)]
    Conflict(#[from] TaskConflict),

    /// The backend aborted the transaction; the operation is safe to retry.
    #[error("transaction aborted: {0}")]
    Aborted(String),

    /// Backend-level failure: the store is unreachable or misbehaving.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
