//! Domain model for the campus task marketplace.
//!
//! The domain models task posting, guarded lifecycle transitions (accept,
//! complete, cancel), and user profiles with aggregate stat counters, while
//! keeping all infrastructure concerns outside of the domain boundary.

mod category;
mod error;
mod ids;
mod status;
mod task;
mod user;

pub use category::TaskCategory;
pub use error::{
    InvalidUserId, ParseCategoryError, ParseStatusError, ProfileValidationError, TaskConflict,
    TaskValidationError,
};
pub use ids::{TaskId, UserId};
pub use status::TaskStatus;
pub use task::{PersistedTaskData, Task, TaskDraft, MIN_TITLE_LEN};
pub use user::{NewProfile, PersistedProfileData, ProfileUpdate, StatDelta, StatField, UserProfile};
