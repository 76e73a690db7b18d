//! Shared helpers for the marketplace unit tests.

use crate::domain::{Task, TaskCategory, TaskDraft, UserId};
use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use mockable::Clock;
use std::sync::atomic::{AtomicI64, Ordering};

/// Deterministic clock advancing one second per reading, so tests can rely
/// on strictly ordered timestamps.
#[derive(Debug)]
pub struct StepClock {
    epoch: DateTime<Utc>,
    ticks: AtomicI64,
}

impl StepClock {
    pub fn new() -> Self {
        Self {
            epoch: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).single().expect("valid epoch"),
            ticks: AtomicI64::new(0),
        }
    }

    fn next(&self) -> DateTime<Utc> {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst);
        self.epoch + Duration::seconds(tick)
    }
}

impl Clock for StepClock {
    fn local(&self) -> DateTime<Local> {
        self.next().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.next()
    }
}

/// Builds a validated user id from a literal.
pub fn uid(value: &str) -> UserId {
    UserId::new(value).expect("valid user id")
}

/// Posts a plain open task for tests.
pub fn open_task(poster: &str, poster_name: &str, clock: &impl Clock) -> Task {
    let draft = TaskDraft::new(
        "Need notes for CS101",
        "Lecture notes from weeks 3 to 6",
        TaskCategory::Academic,
        uid(poster),
        poster_name,
    )
    .expect("valid draft");
    Task::post(draft, clock)
}
