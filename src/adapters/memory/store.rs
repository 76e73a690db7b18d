//! Thread-safe in-memory implementation of the store port.
//!
//! Transactions hold the single write lock across read-decide-write, which
//! makes them linearizable against concurrent transactions on the same task.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::watch;

use crate::domain::{ProfileUpdate, StatDelta, Task, TaskId, UserId, UserProfile};
use crate::ports::{
    MarketplaceStore, ProfileWatch, StoreError, StoreResult, TaskDecision, TaskWatch, TaskWrites,
};

/// Thread-safe in-memory marketplace store.
#[derive(Debug, Clone)]
pub struct InMemoryMarketplaceStore {
    state: Arc<RwLock<InMemoryState>>,
    tasks_tx: Arc<watch::Sender<Vec<Task>>>,
}

#[derive(Debug, Default)]
struct InMemoryState {
    tasks: HashMap<TaskId, Task>,
    profiles: HashMap<UserId, UserProfile>,
    profile_channels: HashMap<UserId, watch::Sender<Option<UserProfile>>>,
}

impl InMemoryMarketplaceStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        let (tasks_tx, _tasks_rx) = watch::channel(Vec::new());
        Self {
            state: Arc::new(RwLock::new(InMemoryState::default())),
            tasks_tx: Arc::new(tasks_tx),
        }
    }

    fn publish_tasks(&self, state: &InMemoryState) {
        drop(self.tasks_tx.send_replace(task_snapshot(state)));
    }
}

impl Default for InMemoryMarketplaceStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Full task collection ordered by creation time descending.
fn task_snapshot(state: &InMemoryState) -> Vec<Task> {
    let mut tasks: Vec<Task> = state.tasks.values().cloned().collect();
    tasks.sort_by(|a, b| b.created_at().cmp(&a.created_at()));
    tasks
}

fn publish_profile(state: &InMemoryState, uid: &UserId) {
    if let Some(channel) = state.profile_channels.get(uid) {
        drop(channel.send_replace(state.profiles.get(uid).cloned()));
    }
}

/// Verifies every delta references a registered profile before any write.
fn check_delta_targets(state: &InMemoryState, stats: &[StatDelta]) -> StoreResult<()> {
    for delta in stats {
        if !state.profiles.contains_key(delta.user()) {
            return Err(StoreError::ProfileNotFound(delta.user().clone()));
        }
    }
    Ok(())
}

fn apply_deltas(state: &mut InMemoryState, stats: &[StatDelta]) {
    for delta in stats {
        if let Some(profile) = state.profiles.get_mut(delta.user()) {
            profile.apply_delta(delta);
        }
    }
}

fn lock_poisoned(err: impl std::fmt::Display) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl MarketplaceStore for InMemoryMarketplaceStore {
    async fn insert_task(&self, task: &Task, stats: &[StatDelta]) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.tasks.contains_key(&task.id()) {
            return Err(StoreError::DuplicateTask(task.id()));
        }
        check_delta_targets(&state, stats)?;

        state.tasks.insert(task.id(), task.clone());
        apply_deltas(&mut state, stats);

        self.publish_tasks(&state);
        for delta in stats {
            publish_profile(&state, delta.user());
        }
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.tasks.get(&id).cloned())
    }

    async fn transact_task(&self, id: TaskId, decide: TaskDecision) -> StoreResult<Task> {
        let mut state = self.state.write().map_err(lock_poisoned)?;

        let current = state
            .tasks
            .get(&id)
            .ok_or(StoreError::TaskNotFound(id))?
            .clone();
        let TaskWrites { task, stats } = decide(&current)?;
        debug_assert!(task.id() == id, "decision must not change the task id");
        check_delta_targets(&state, &stats)?;

        state.tasks.insert(id, task.clone());
        apply_deltas(&mut state, &stats);

        self.publish_tasks(&state);
        for delta in &stats {
            publish_profile(&state, delta.user());
        }
        Ok(task)
    }

    async fn watch_tasks(&self) -> StoreResult<TaskWatch> {
        Ok(self.tasks_tx.subscribe())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        if state.profiles.contains_key(profile.uid()) {
            return Err(StoreError::DuplicateProfile(profile.uid().clone()));
        }
        state.profiles.insert(profile.uid().clone(), profile.clone());
        publish_profile(&state, profile.uid());
        Ok(())
    }

    async fn get_profile(&self, uid: &UserId) -> StoreResult<Option<UserProfile>> {
        let state = self.state.read().map_err(lock_poisoned)?;
        Ok(state.profiles.get(uid).cloned())
    }

    async fn update_profile(
        &self,
        uid: &UserId,
        update: ProfileUpdate,
    ) -> StoreResult<UserProfile> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let profile = state
            .profiles
            .get_mut(uid)
            .ok_or_else(|| StoreError::ProfileNotFound(uid.clone()))?;
        profile.apply_update(&update);
        let updated = profile.clone();
        publish_profile(&state, uid);
        Ok(updated)
    }

    async fn increment_stat(&self, delta: &StatDelta) -> StoreResult<()> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let profile = state
            .profiles
            .get_mut(delta.user())
            .ok_or_else(|| StoreError::ProfileNotFound(delta.user().clone()))?;
        profile.apply_delta(delta);
        publish_profile(&state, delta.user());
        Ok(())
    }

    async fn watch_profile(&self, uid: &UserId) -> StoreResult<ProfileWatch> {
        let mut state = self.state.write().map_err(lock_poisoned)?;
        let InMemoryState {
            profiles,
            profile_channels,
            ..
        } = &mut *state;
        let channel = profile_channels
            .entry(uid.clone())
            .or_insert_with(|| watch::channel(profiles.get(uid).cloned()).0);
        Ok(channel.subscribe())
    }
}
