//! Feed projection tests: visibility rules, ordering, and live updates.

use std::sync::Arc;

use super::support::{open_task, uid, StepClock};
use crate::adapters::memory::InMemoryMarketplaceStore;
use crate::domain::{Task, TaskStatus};
use crate::ports::MarketplaceStore;
use crate::services::{feed_iter, project_feed, TaskFeed};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> StepClock {
    StepClock::new()
}

fn accepted_task(poster: &str, accepter: &str, clock: &StepClock) -> Task {
    let mut task = open_task(poster, poster, clock);
    task.accept(uid(accepter), accepter, clock)
        .expect("open task accepts");
    task
}

fn completed_task(poster: &str, accepter: &str, clock: &StepClock) -> Task {
    let mut task = accepted_task(poster, accepter, clock);
    task.complete(&uid(accepter), clock).expect("acceptor completes");
    task
}

fn cancelled_task(poster: &str, clock: &StepClock) -> Task {
    let mut task = open_task(poster, poster, clock);
    task.cancel(&uid(poster)).expect("poster cancels");
    task
}

#[rstest]
fn feed_shows_other_users_open_tasks_only(clock: StepClock) {
    let own_open = open_task("alice", "Alice", &clock);
    let other_open = open_task("bob", "Bob", &clock);

    let feed = project_feed(&[own_open, other_open.clone()], &uid("alice"));

    assert_eq!(feed, vec![other_open]);
}

#[rstest]
fn feed_shows_tasks_the_viewer_accepted(clock: StepClock) {
    let mine_accepted = accepted_task("alice", "bob", &clock);
    let mine_completed = completed_task("carol", "bob", &clock);
    let someone_elses = accepted_task("alice", "dave", &clock);

    let feed = project_feed(
        &[
            mine_accepted.clone(),
            mine_completed.clone(),
            someone_elses,
        ],
        &uid("bob"),
    );

    assert_eq!(feed.len(), 2);
    assert!(feed.contains(&mine_accepted));
    assert!(feed.contains(&mine_completed));
}

#[rstest]
fn feed_hides_cancelled_tasks_from_everyone(clock: StepClock) {
    let cancelled = cancelled_task("alice", &clock);
    let snapshot = vec![cancelled];

    assert!(project_feed(&snapshot, &uid("alice")).is_empty());
    assert!(project_feed(&snapshot, &uid("bob")).is_empty());
}

#[rstest]
fn feed_orders_newest_first(clock: StepClock) {
    let oldest = open_task("bob", "Bob", &clock);
    let middle = open_task("carol", "Carol", &clock);
    let newest = open_task("dave", "Dave", &clock);

    // Deliver the snapshot in shuffled order; projection must re-sort.
    let feed = project_feed(
        &[middle.clone(), newest.clone(), oldest.clone()],
        &uid("alice"),
    );

    assert_eq!(feed, vec![newest, middle, oldest]);
}

#[rstest]
fn feed_projection_is_idempotent(clock: StepClock) {
    let snapshot = vec![
        open_task("bob", "Bob", &clock),
        accepted_task("carol", "alice", &clock),
        cancelled_task("dave", &clock),
    ];

    let first = project_feed(&snapshot, &uid("alice"));
    let second = project_feed(&snapshot, &uid("alice"));

    assert_eq!(first, second);
}

#[rstest]
fn empty_feed_is_a_valid_result(clock: StepClock) {
    let own_only = vec![open_task("alice", "Alice", &clock)];
    assert!(project_feed(&own_only, &uid("alice")).is_empty());
    assert!(project_feed(&[], &uid("alice")).is_empty());
}

#[rstest]
fn feed_iter_is_restartable(clock: StepClock) {
    let snapshot = vec![
        open_task("bob", "Bob", &clock),
        open_task("alice", "Alice", &clock),
        open_task("carol", "Carol", &clock),
    ];
    let viewer = uid("alice");

    let first: Vec<_> = feed_iter(&snapshot, &viewer).collect();
    let second: Vec<_> = feed_iter(&snapshot, &viewer).collect();

    assert_eq!(first, second);
    assert_eq!(first.len(), 2);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn subscribed_feed_tracks_store_changes(clock: StepClock) {
    let store = Arc::new(InMemoryMarketplaceStore::new());
    let mut feed = TaskFeed::subscribe(store.as_ref(), uid("bob"))
        .await
        .expect("subscription should succeed");
    assert!(feed.current().is_empty());

    let task = open_task("alice", "Alice", &clock);
    store
        .insert_task(&task, &[])
        .await
        .expect("insert should succeed");

    let projected = feed
        .next_change()
        .await
        .expect("a change should be delivered");
    assert_eq!(projected, vec![task.clone()]);

    // The poster's own feed stays empty for the same change.
    let poster_feed = TaskFeed::subscribe(store.as_ref(), uid("alice"))
        .await
        .expect("subscription should succeed");
    assert!(poster_feed.current().is_empty());
    assert_eq!(feed.viewer(), &uid("bob"));
    assert_eq!(feed.current(), vec![task]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn accepted_task_moves_between_feeds(clock: StepClock) {
    let store = Arc::new(InMemoryMarketplaceStore::new());
    let task = open_task("alice", "Alice", &clock);
    store
        .insert_task(&task, &[])
        .await
        .expect("insert should succeed");

    let mut bob_feed = TaskFeed::subscribe(store.as_ref(), uid("bob"))
        .await
        .expect("subscription should succeed");
    let mut carol_feed = TaskFeed::subscribe(store.as_ref(), uid("carol"))
        .await
        .expect("subscription should succeed");

    let shared_clock = Arc::new(clock);
    let decide_clock = Arc::clone(&shared_clock);
    store
        .transact_task(
            task.id(),
            Arc::new(move |current: &Task| {
                let mut accepted = current.clone();
                accepted.accept(uid("bob"), "Bob", &*decide_clock)?;
                Ok(crate::ports::TaskWrites::task_only(accepted))
            }),
        )
        .await
        .expect("accept transaction should succeed");

    let bob_view = bob_feed
        .next_change()
        .await
        .expect("a change should be delivered");
    assert_eq!(bob_view.len(), 1);
    assert!(bob_view
        .first()
        .is_some_and(|t| t.status() == TaskStatus::Accepted));

    let carol_view = carol_feed
        .next_change()
        .await
        .expect("a change should be delivered");
    assert!(carol_view.is_empty());
}
