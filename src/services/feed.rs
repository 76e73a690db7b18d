//! Per-viewer feed projection over the task collection.
//!
//! A task appears in a viewer's feed iff it is open and posted by someone
//! else, or the viewer accepted it and it is accepted or completed. The
//! projection re-sorts by creation time descending on every recomputation:
//! change-stream ordering is not guaranteed to be stable across partial
//! updates.

use crate::domain::{Task, TaskStatus, UserId};
use crate::ports::{MarketplaceStore, StoreResult, TaskWatch};

/// Returns whether `task` belongs in `viewer`'s feed.
fn visible_to(task: &Task, viewer: &UserId) -> bool {
    match task.status() {
        TaskStatus::Open => task.posted_by() != viewer,
        TaskStatus::Accepted | TaskStatus::Completed => task.accepted_by() == Some(viewer),
        TaskStatus::Cancelled => false,
    }
}

/// Lazily filters a task snapshot down to `viewer`'s feed, preserving the
/// snapshot's order. Restartable: iterating twice over the same snapshot
/// yields the same sequence.
pub fn feed_iter<'a>(
    snapshot: &'a [Task],
    viewer: &'a UserId,
) -> impl Iterator<Item = &'a Task> + 'a {
    snapshot.iter().filter(move |task| visible_to(task, viewer))
}

/// Projects a task snapshot into `viewer`'s feed, re-sorted by creation time
/// descending. An empty result is a valid, displayable state.
///
/// Idempotent: recomputing from an unchanged snapshot yields an identical
/// ordered list.
#[must_use]
pub fn project_feed(snapshot: &[Task], viewer: &UserId) -> Vec<Task> {
    let mut feed: Vec<Task> = feed_iter(snapshot, viewer).cloned().collect();
    feed.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    feed
}

/// A live feed subscription for one viewer.
///
/// Owns its change-stream handle: dropping the feed releases the
/// subscription, and subscribing again replaces the prior handle. One
/// consuming context should hold at most one feed at a time.
#[derive(Debug)]
pub struct TaskFeed {
    viewer: UserId,
    watch: TaskWatch,
}

impl TaskFeed {
    /// Subscribes to the store's task change stream for `viewer`.
    ///
    /// # Errors
    ///
    /// Returns the store's error when the subscription cannot be
    /// established.
    pub async fn subscribe<S>(store: &S, viewer: UserId) -> StoreResult<Self>
    where
        S: MarketplaceStore + ?Sized,
    {
        let watch = store.watch_tasks().await?;
        Ok(Self { viewer, watch })
    }

    /// Returns the viewer this feed projects for.
    #[must_use]
    pub const fn viewer(&self) -> &UserId {
        &self.viewer
    }

    /// Projects the most recently delivered snapshot.
    #[must_use]
    pub fn current(&self) -> Vec<Task> {
        project_feed(&self.watch.borrow(), &self.viewer)
    }

    /// Waits for the next change-stream event and projects the new
    /// snapshot. Returns `None` once the store side of the stream is gone;
    /// no further events are delivered after that.
    pub async fn next_change(&mut self) -> Option<Vec<Task>> {
        self.watch.changed().await.ok()?;
        let snapshot = self.watch.borrow_and_update().clone();
        Some(project_feed(&snapshot, &self.viewer))
    }
}
