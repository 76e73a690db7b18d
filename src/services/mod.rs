//! Application services for the marketplace core.

mod feed;
mod lifecycle;
mod profile;
mod stats;

pub use feed::{feed_iter, project_feed, TaskFeed};
pub use lifecycle::{LifecycleError, LifecycleResult, PostTaskRequest, TaskLifecycleService};
pub use profile::{ProfileError, ProfileResult, ProfileService, RegisterProfileRequest};
pub use stats::UserStatsService;
