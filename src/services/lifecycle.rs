//! Task lifecycle orchestration: post, accept, complete, cancel.
//!
//! Every transition runs as a single atomic store transaction spanning the
//! precondition check and the write, so concurrent attempts on the same task
//! are serialized by the store and exactly one of two racing accepts wins.

use crate::domain::{
    StatDelta, Task, TaskCategory, TaskConflict, TaskDraft, TaskId, TaskValidationError, UserId,
};
use crate::ports::{MarketplaceStore, StoreError, TaskDecision, TaskWrites};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for posting a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostTaskRequest {
    title: String,
    description: String,
    category: TaskCategory,
    poster: UserId,
    poster_name: Option<String>,
}

impl PostTaskRequest {
    /// Creates a request with the required fields.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: TaskCategory,
        poster: UserId,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category,
            poster,
            poster_name: None,
        }
    }

    /// Sets the poster display-name snapshot.
    #[must_use]
    pub fn with_poster_name(mut self, name: impl Into<String>) -> Self {
        self.poster_name = Some(name.into());
        self
    }
}

/// Service-level errors for lifecycle operations.
///
/// Every variant renders a human-readable message; no operation fails
/// silently.
#[derive(Debug, Clone, Error)]
pub enum LifecycleError {
    /// Bad input, caught before any store call.
    #[error(transparent)]
    Validation(#[from] TaskValidationError),

    /// The referenced task does not exist.
    #[error("task not found: {0}")]
    NotFound(TaskId),

    /// A counter delta referenced an unregistered user.
    #[error("no profile registered for user {0}")]
    UnknownUser(UserId),

    /// A precondition was invalidated by a concurrent writer. Terminal for
    /// this operation: re-fetch and re-decide rather than retry.
    #[error(transparent)]
    Conflict(#[from] TaskConflict),

    /// The store aborted the transaction. Safe to retry.
    #[error("operation aborted: {0}")]
    Aborted(String),

    /// The store is unreachable or misbehaving.
    #[error("store unavailable: {0}")]
    Transport(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl From<StoreError> for LifecycleError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TaskNotFound(id) => Self::NotFound(id),
            StoreError::ProfileNotFound(uid) => Self::UnknownUser(uid),
            StoreError::Conflict(conflict) => Self::Conflict(conflict),
            StoreError::Aborted(reason) => Self::Aborted(reason),
            // A fresh UUID colliding means something is badly wrong with the
            // backend, not with the request.
            StoreError::DuplicateTask(id) => Self::Aborted(format!("task id collision: {id}")),
            StoreError::DuplicateProfile(uid) => {
                Self::Aborted(format!("profile already exists: {uid}"))
            }
            StoreError::Persistence(source) => Self::Transport(source),
        }
    }
}

/// Result type for lifecycle service operations.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Task lifecycle orchestration service.
#[derive(Clone)]
pub struct TaskLifecycleService<S, C>
where
    S: MarketplaceStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> TaskLifecycleService<S, C>
where
    S: MarketplaceStore,
    C: Clock + Send + Sync + 'static,
{
    /// Creates a new lifecycle service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Posts a new open task and increments the poster's posted-task counter
    /// in the same atomic store write.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Validation`] before any store call when the
    /// title or description is rejected, and store-mapped errors otherwise.
    pub async fn post_task(&self, request: PostTaskRequest) -> LifecycleResult<Task> {
        let PostTaskRequest {
            title,
            description,
            category,
            poster,
            poster_name,
        } = request;

        let draft = TaskDraft::new(
            title,
            description,
            category,
            poster.clone(),
            poster_name.unwrap_or_default(),
        )?;
        let task = Task::post(draft, &*self.clock);

        self.store
            .insert_task(&task, &[StatDelta::posted(poster)])
            .await?;
        tracing::info!(task_id = %task.id(), poster = %task.posted_by(), "task posted");
        Ok(task)
    }

    /// Accepts an open task on behalf of `accepter`.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NotFound`] when the task does not exist and
    /// [`LifecycleError::Conflict`] when it is no longer open or already
    /// accepted; exactly one of two concurrent accepts succeeds.
    pub async fn accept_task(
        &self,
        id: TaskId,
        accepter: UserId,
        accepter_name: impl Into<String>,
    ) -> LifecycleResult<Task> {
        let name = accepter_name.into();
        let clock = Arc::clone(&self.clock);
        let log_accepter = accepter.clone();
        let decide: TaskDecision = Arc::new(move |current: &Task| {
            let mut task = current.clone();
            task.accept(accepter.clone(), name.clone(), &*clock)?;
            Ok(TaskWrites::task_only(task))
        });

        let task = self.run_transition(id, decide, "accept").await?;
        tracing::info!(task_id = %id, accepter = %log_accepter, "task accepted");
        Ok(task)
    }

    /// Completes an accepted task on behalf of its acceptor and increments
    /// the acceptor's completed-task counter in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Conflict`] when the task is not accepted or
    /// `accepter` is not the recorded acceptor; the task write and the
    /// counter increment land both-or-neither.
    pub async fn complete_task(&self, id: TaskId, accepter: UserId) -> LifecycleResult<Task> {
        let clock = Arc::clone(&self.clock);
        let log_accepter = accepter.clone();
        let decide: TaskDecision = Arc::new(move |current: &Task| {
            let mut task = current.clone();
            task.complete(&accepter, &*clock)?;
            Ok(TaskWrites {
                task,
                stats: vec![StatDelta::completed(accepter.clone())],
            })
        });

        let task = self.run_transition(id, decide, "complete").await?;
        tracing::info!(task_id = %id, accepter = %log_accepter, "task completed");
        Ok(task)
    }

    /// Cancels an open task on behalf of its poster.
    ///
    /// Ownership and status are re-checked inside the transaction, so a task
    /// accepted between the caller's last read and this call is not
    /// cancelled out from under its acceptor.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::Conflict`] when the task is no longer open
    /// or `requester` did not post it.
    pub async fn cancel_task(&self, id: TaskId, requester: UserId) -> LifecycleResult<Task> {
        let log_requester = requester.clone();
        let decide: TaskDecision = Arc::new(move |current: &Task| {
            let mut task = current.clone();
            task.cancel(&requester)?;
            Ok(TaskWrites::task_only(task))
        });

        let task = self.run_transition(id, decide, "cancel").await?;
        tracing::info!(task_id = %id, requester = %log_requester, "task cancelled");
        Ok(task)
    }

    /// Retrieves a task by identifier. Returns `Ok(None)` when absent.
    ///
    /// # Errors
    ///
    /// Returns store-mapped errors when the lookup fails.
    pub async fn find_task(&self, id: TaskId) -> LifecycleResult<Option<Task>> {
        Ok(self.store.get_task(id).await?)
    }

    async fn run_transition(
        &self,
        id: TaskId,
        decide: TaskDecision,
        operation: &'static str,
    ) -> LifecycleResult<Task> {
        self.store
            .transact_task(id, decide)
            .await
            .map_err(LifecycleError::from)
            .inspect_err(|err| tracing::warn!(task_id = %id, operation, %err, "transition rejected"))
    }
}
