//! `PostgreSQL` implementation of the store port.
//!
//! Task transactions run as serializable database transactions with
//! `SELECT ... FOR UPDATE`, so the precondition check and the write form one
//! atomic unit and racing transitions on the same task are serialized by the
//! database. Counter increments run as `SET x = x + 1` in SQL, never as a
//! client-side read-modify-write.
//!
//! Change streams are republished locally after each successful write: the
//! marketplace's concurrency model is a single logical client per process,
//! and cross-process integrity rests on the database transaction, not on the
//! notification path.

use super::{
    models::{NewProfileRow, NewTaskRow, ProfileDetailsChangeset, ProfileRow, TaskRow},
    schema::{profiles, tasks},
};
use crate::domain::{
    PersistedProfileData, PersistedTaskData, ProfileUpdate, StatDelta, StatField, Task,
    TaskCategory, TaskId, TaskStatus, UserId, UserProfile,
};
use crate::ports::{
    MarketplaceStore, ProfileWatch, StoreError, StoreResult, TaskDecision, TaskWatch, TaskWrites,
};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// `PostgreSQL` connection pool type used by the marketplace adapter.
pub type MarketplacePgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed marketplace store.
#[derive(Clone)]
pub struct PostgresMarketplaceStore {
    pool: MarketplacePgPool,
    tasks_tx: Arc<watch::Sender<Vec<Task>>>,
    profile_channels: Arc<Mutex<HashMap<UserId, watch::Sender<Option<UserProfile>>>>>,
}

impl PostgresMarketplaceStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub fn new(pool: MarketplacePgPool) -> Self {
        let (tasks_tx, _tasks_rx) = watch::channel(Vec::new());
        Self {
            pool,
            tasks_tx: Arc::new(tasks_tx),
            profile_channels: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Reloads the task collection and republishes it to subscribers.
    ///
    /// Called after every successful task write; also usable at startup to
    /// prime the change stream before the first mutation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Persistence`] when the snapshot query fails.
    pub async fn refresh(&self) -> StoreResult<()> {
        let snapshot = self
            .run_blocking(move |connection| {
                let rows = tasks::table
                    .order(tasks::created_at.desc())
                    .select(TaskRow::as_select())
                    .load::<TaskRow>(connection)
                    .map_err(StoreError::persistence)?;
                rows.into_iter().map(row_to_task).collect::<StoreResult<Vec<_>>>()
            })
            .await?;
        drop(self.tasks_tx.send_replace(snapshot));
        Ok(())
    }

    async fn run_blocking<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(StoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(StoreError::persistence)?
    }

    async fn load_profile(&self, uid: &UserId) -> StoreResult<Option<UserProfile>> {
        let lookup = uid.as_str().to_owned();
        self.run_blocking(move |connection| {
            let row = profiles::table
                .filter(profiles::uid.eq(&lookup))
                .select(ProfileRow::as_select())
                .first::<ProfileRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_profile).transpose()
        })
        .await
    }

    /// Republishes one profile to its change stream, if anyone subscribed.
    async fn republish_profile(&self, uid: &UserId) -> StoreResult<()> {
        let subscribed = {
            let channels = self.profile_channels.lock().map_err(lock_poisoned)?;
            channels.contains_key(uid)
        };
        if !subscribed {
            return Ok(());
        }
        let current = self.load_profile(uid).await?;
        let channels = self.profile_channels.lock().map_err(lock_poisoned)?;
        if let Some(channel) = channels.get(uid) {
            drop(channel.send_replace(current));
        }
        Ok(())
    }
}

#[async_trait]
impl MarketplaceStore for PostgresMarketplaceStore {
    async fn insert_task(&self, task: &Task, stats: &[StatDelta]) -> StoreResult<()> {
        let task_id = task.id();
        let new_row = to_new_task_row(task);
        let deltas = stats.to_vec();

        self.run_blocking(move |connection| {
            connection.build_transaction().run(|connection| {
                diesel::insert_into(tasks::table)
                    .values(&new_row)
                    .execute(connection)
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            StoreError::DuplicateTask(task_id)
                        }
                        other => other.into(),
                    })?;
                apply_deltas(connection, &deltas)
            })
        })
        .await?;

        self.refresh().await?;
        for delta in stats {
            self.republish_profile(delta.user()).await?;
        }
        Ok(())
    }

    async fn get_task(&self, id: TaskId) -> StoreResult<Option<Task>> {
        self.run_blocking(move |connection| {
            let row = tasks::table
                .filter(tasks::id.eq(id.into_inner()))
                .select(TaskRow::as_select())
                .first::<TaskRow>(connection)
                .optional()
                .map_err(StoreError::persistence)?;
            row.map(row_to_task).transpose()
        })
        .await
    }

    async fn transact_task(&self, id: TaskId, decide: TaskDecision) -> StoreResult<Task> {
        let (task, stats) = self
            .run_blocking(move |connection| {
                connection
                    .build_transaction()
                    .serializable()
                    .run(|connection| {
                        let row = tasks::table
                            .filter(tasks::id.eq(id.into_inner()))
                            .select(TaskRow::as_select())
                            .for_update()
                            .first::<TaskRow>(connection)
                            .optional()?
                            .ok_or(StoreError::TaskNotFound(id))?;
                        let current = row_to_task(row)?;

                        let TaskWrites { task, stats } =
                            decide(&current).map_err(StoreError::Conflict)?;
                        debug_assert!(task.id() == id, "decision must not change the task id");

                        diesel::update(tasks::table.filter(tasks::id.eq(id.into_inner())))
                            .set((
                                tasks::status.eq(task.status().as_str().to_owned()),
                                tasks::accepted_by
                                    .eq(task.accepted_by().map(|user| user.as_str().to_owned())),
                                tasks::accepted_by_name
                                    .eq(task.accepted_by_name().map(ToOwned::to_owned)),
                                tasks::accepted_at.eq(task.accepted_at()),
                                tasks::completed_at.eq(task.completed_at()),
                            ))
                            .execute(connection)?;
                        apply_deltas(connection, &stats)?;
                        Ok((task, stats))
                    })
            })
            .await?;

        self.refresh().await?;
        for delta in &stats {
            self.republish_profile(delta.user()).await?;
        }
        Ok(task)
    }

    async fn watch_tasks(&self) -> StoreResult<TaskWatch> {
        self.refresh().await?;
        Ok(self.tasks_tx.subscribe())
    }

    async fn insert_profile(&self, profile: &UserProfile) -> StoreResult<()> {
        let uid = profile.uid().clone();
        let new_row = to_new_profile_row(profile)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(profiles::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        StoreError::DuplicateProfile(uid.clone())
                    }
                    other => StoreError::persistence(other),
                })?;
            Ok(())
        })
        .await?;

        self.republish_profile(profile.uid()).await
    }

    async fn get_profile(&self, uid: &UserId) -> StoreResult<Option<UserProfile>> {
        self.load_profile(uid).await
    }

    async fn update_profile(
        &self,
        uid: &UserId,
        update: ProfileUpdate,
    ) -> StoreResult<UserProfile> {
        if update.is_empty() {
            return self
                .load_profile(uid)
                .await?
                .ok_or_else(|| StoreError::ProfileNotFound(uid.clone()));
        }

        let lookup = uid.as_str().to_owned();
        let missing = uid.clone();
        let changeset = ProfileDetailsChangeset {
            name: update.name().map(ToOwned::to_owned),
            phone: update.phone().map(ToOwned::to_owned),
            bio: update.bio().map(ToOwned::to_owned),
        };

        let updated = self
            .run_blocking(move |connection| {
                let row = diesel::update(profiles::table.filter(profiles::uid.eq(&lookup)))
                    .set(&changeset)
                    .returning(ProfileRow::as_returning())
                    .get_result::<ProfileRow>(connection)
                    .optional()
                    .map_err(StoreError::persistence)?
                    .ok_or(StoreError::ProfileNotFound(missing))?;
                row_to_profile(row)
            })
            .await?;

        self.republish_profile(uid).await?;
        Ok(updated)
    }

    async fn increment_stat(&self, delta: &StatDelta) -> StoreResult<()> {
        let owned = delta.clone();
        self.run_blocking(move |connection| apply_deltas(connection, std::slice::from_ref(&owned)))
            .await?;
        self.republish_profile(delta.user()).await
    }

    async fn watch_profile(&self, uid: &UserId) -> StoreResult<ProfileWatch> {
        let current = self.load_profile(uid).await?;
        let mut channels = self.profile_channels.lock().map_err(lock_poisoned)?;
        let channel = channels
            .entry(uid.clone())
            .or_insert_with(|| watch::channel(None).0);
        drop(channel.send_replace(current));
        Ok(channel.subscribe())
    }
}

impl From<DieselError> for StoreError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::DatabaseError(DatabaseErrorKind::SerializationFailure, info) => {
                Self::Aborted(info.message().to_owned())
            }
            other => Self::persistence(other),
        }
    }
}

/// Applies counter increments as commutative SQL updates.
fn apply_deltas(connection: &mut PgConnection, stats: &[StatDelta]) -> StoreResult<()> {
    for delta in stats {
        let target = profiles::table.filter(profiles::uid.eq(delta.user().as_str()));
        let updated = match delta.field() {
            StatField::TasksPosted => diesel::update(target)
                .set(profiles::tasks_posted.eq(profiles::tasks_posted + 1))
                .execute(connection)?,
            StatField::TasksCompleted => diesel::update(target)
                .set(profiles::tasks_completed.eq(profiles::tasks_completed + 1))
                .execute(connection)?,
        };
        if updated == 0 {
            return Err(StoreError::ProfileNotFound(delta.user().clone()));
        }
    }
    Ok(())
}

fn lock_poisoned(err: impl std::fmt::Display) -> StoreError {
    StoreError::persistence(std::io::Error::other(err.to_string()))
}

fn to_new_task_row(task: &Task) -> NewTaskRow {
    NewTaskRow {
        id: task.id().into_inner(),
        title: task.title().to_owned(),
        description: task.description().to_owned(),
        category: task.category().as_str().to_owned(),
        status: task.status().as_str().to_owned(),
        posted_by: task.posted_by().as_str().to_owned(),
        posted_by_name: task.posted_by_name().to_owned(),
        created_at: task.created_at(),
        accepted_by: task.accepted_by().map(|user| user.as_str().to_owned()),
        accepted_by_name: task.accepted_by_name().map(ToOwned::to_owned),
        accepted_at: task.accepted_at(),
        completed_at: task.completed_at(),
    }
}

fn row_to_task(row: TaskRow) -> StoreResult<Task> {
    let TaskRow {
        id,
        title,
        description,
        category: persisted_category,
        status: persisted_status,
        posted_by: persisted_poster,
        posted_by_name,
        created_at,
        accepted_by: persisted_acceptor,
        accepted_by_name,
        accepted_at,
        completed_at,
    } = row;

    let category =
        TaskCategory::try_from(persisted_category.as_str()).map_err(StoreError::persistence)?;
    let status =
        TaskStatus::try_from(persisted_status.as_str()).map_err(StoreError::persistence)?;
    let posted_by = UserId::new(persisted_poster).map_err(StoreError::persistence)?;
    let accepted_by = persisted_acceptor
        .map(UserId::new)
        .transpose()
        .map_err(StoreError::persistence)?;

    let data = PersistedTaskData {
        id: TaskId::from_uuid(id),
        title,
        description,
        category,
        status,
        posted_by,
        posted_by_name,
        created_at,
        accepted_by,
        accepted_by_name,
        accepted_at,
        completed_at,
    };
    Ok(Task::from_persisted(data))
}

fn to_new_profile_row(profile: &UserProfile) -> StoreResult<NewProfileRow> {
    Ok(NewProfileRow {
        uid: profile.uid().as_str().to_owned(),
        name: profile.name().to_owned(),
        email: profile.email().to_owned(),
        phone: profile.phone().to_owned(),
        bio: profile.bio().to_owned(),
        rating: profile.rating(),
        tasks_posted: i64::try_from(profile.tasks_posted()).map_err(StoreError::persistence)?,
        tasks_completed: i64::try_from(profile.tasks_completed())
            .map_err(StoreError::persistence)?,
        created_at: profile.created_at(),
    })
}

fn row_to_profile(row: ProfileRow) -> StoreResult<UserProfile> {
    let ProfileRow {
        uid,
        name,
        email,
        phone,
        bio,
        rating,
        tasks_posted,
        tasks_completed,
        created_at,
    } = row;

    let data = PersistedProfileData {
        uid: UserId::new(uid).map_err(StoreError::persistence)?,
        name,
        email,
        phone,
        bio,
        rating,
        tasks_posted: u64::try_from(tasks_posted).map_err(StoreError::persistence)?,
        tasks_completed: u64::try_from(tasks_completed).map_err(StoreError::persistence)?,
        created_at,
    };
    Ok(UserProfile::from_persisted(data))
}
