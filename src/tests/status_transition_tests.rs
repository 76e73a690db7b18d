//! Unit tests for lifecycle status transitions and aggregate guards.

use super::support::{open_task, uid, StepClock};
use crate::domain::{TaskConflict, TaskStatus};
use eyre::{bail, ensure};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> StepClock {
    StepClock::new()
}

#[rstest]
#[case(TaskStatus::Open, TaskStatus::Open, false)]
#[case(TaskStatus::Open, TaskStatus::Accepted, true)]
#[case(TaskStatus::Open, TaskStatus::Completed, false)]
#[case(TaskStatus::Open, TaskStatus::Cancelled, true)]
#[case(TaskStatus::Accepted, TaskStatus::Open, false)]
#[case(TaskStatus::Accepted, TaskStatus::Accepted, false)]
#[case(TaskStatus::Accepted, TaskStatus::Completed, true)]
#[case(TaskStatus::Accepted, TaskStatus::Cancelled, false)]
#[case(TaskStatus::Completed, TaskStatus::Open, false)]
#[case(TaskStatus::Completed, TaskStatus::Accepted, false)]
#[case(TaskStatus::Completed, TaskStatus::Completed, false)]
#[case(TaskStatus::Completed, TaskStatus::Cancelled, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Open, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Accepted, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Completed, false)]
#[case(TaskStatus::Cancelled, TaskStatus::Cancelled, false)]
fn can_transition_to_returns_expected(
    #[case] from: TaskStatus,
    #[case] to: TaskStatus,
    #[case] expected: bool,
) {
    assert_eq!(from.can_transition_to(to), expected);
}

#[rstest]
#[case(TaskStatus::Open, false)]
#[case(TaskStatus::Accepted, false)]
#[case(TaskStatus::Completed, true)]
#[case(TaskStatus::Cancelled, true)]
fn is_terminal_returns_expected(#[case] status: TaskStatus, #[case] expected: bool) {
    assert_eq!(status.is_terminal(), expected);
}

#[rstest]
fn accept_moves_open_task_to_accepted(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);

    task.accept(uid("bob"), "Bob", &clock)?;

    ensure!(task.status() == TaskStatus::Accepted);
    ensure!(task.accepted_by() == Some(&uid("bob")));
    ensure!(task.accepted_by_name() == Some("Bob"));
    ensure!(task.accepted_at().is_some());
    ensure!(task.completed_at().is_none());
    Ok(())
}

#[rstest]
fn accept_records_placeholder_for_empty_name(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);
    task.accept(uid("bob"), "  ", &clock)?;
    ensure!(task.accepted_by_name() == Some("User"));
    Ok(())
}

#[rstest]
fn accept_rejects_already_accepted_task(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);
    task.accept(uid("bob"), "Bob", &clock)?;

    let result = task.accept(uid("carol"), "Carol", &clock);
    let expected = Err(TaskConflict::NotOpen {
        task_id: task.id(),
        status: TaskStatus::Accepted,
    });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(task.accepted_by() == Some(&uid("bob")));
    Ok(())
}

#[rstest]
fn complete_sets_completion_timestamp(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);
    task.accept(uid("bob"), "Bob", &clock)?;

    task.complete(&uid("bob"), &clock)?;

    ensure!(task.status() == TaskStatus::Completed);
    ensure!(task.completed_at().is_some());
    ensure!(task.accepted_by() == Some(&uid("bob")));
    Ok(())
}

#[rstest]
fn complete_by_non_acceptor_is_rejected_without_mutation(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);
    task.accept(uid("bob"), "Bob", &clock)?;

    let result = task.complete(&uid("carol"), &clock);
    let expected = Err(TaskConflict::NotAcceptor { task_id: task.id() });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(task.status() == TaskStatus::Accepted);
    ensure!(task.completed_at().is_none());
    Ok(())
}

#[rstest]
fn complete_requires_accepted_status(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);

    let result = task.complete(&uid("bob"), &clock);
    let expected = Err(TaskConflict::NotAccepted {
        task_id: task.id(),
        status: TaskStatus::Open,
    });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    Ok(())
}

#[rstest]
fn cancel_requires_open_status(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);
    task.accept(uid("bob"), "Bob", &clock)?;

    let result = task.cancel(&uid("alice"));
    let expected = Err(TaskConflict::NotOpen {
        task_id: task.id(),
        status: TaskStatus::Accepted,
    });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(task.status() == TaskStatus::Accepted);
    Ok(())
}

#[rstest]
fn cancel_requires_poster(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);

    let result = task.cancel(&uid("bob"));
    let expected = Err(TaskConflict::NotPoster { task_id: task.id() });

    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    ensure!(task.status() == TaskStatus::Open);
    Ok(())
}

#[rstest]
fn cancel_by_poster_is_terminal(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);

    task.cancel(&uid("alice"))?;

    ensure!(task.status() == TaskStatus::Cancelled);
    ensure!(task.status().is_terminal());
    ensure!(task.accepted_by().is_none());

    let accept_after = task.accept(uid("bob"), "Bob", &clock);
    ensure!(accept_after.is_err());
    Ok(())
}

/// Invariant from the data model: an acceptor is recorded exactly when the
/// status is accepted or completed.
#[rstest]
fn acceptor_presence_matches_status(clock: StepClock) -> eyre::Result<()> {
    let mut task = open_task("alice", "Alice", &clock);
    ensure!(task.accepted_by().is_none() && task.status() == TaskStatus::Open);

    task.accept(uid("bob"), "Bob", &clock)?;
    ensure!(task.accepted_by().is_some() && task.accepted_at().is_some());

    task.complete(&uid("bob"), &clock)?;
    ensure!(task.accepted_by().is_some() && task.completed_at().is_some());
    Ok(())
}
