//! User stat aggregation: atomic counter increments tied to task events.

use super::{ProfileError, ProfileResult};
use crate::domain::{StatDelta, UserId};
use crate::ports::MarketplaceStore;
use std::sync::Arc;

/// Applies counter increments as side effects of lifecycle transitions.
///
/// Each increment is a commutative counter operation on the store side,
/// never a client-side read-modify-write, so concurrent increments cannot
/// lose updates. The lifecycle service bundles these deltas into its own
/// transactions; this service exposes the standalone operations for callers
/// that need them directly.
#[derive(Clone)]
pub struct UserStatsService<S>
where
    S: MarketplaceStore,
{
    store: Arc<S>,
}

impl<S> UserStatsService<S>
where
    S: MarketplaceStore,
{
    /// Creates a new stats service.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Increments the user's posted-task counter by one.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] when the user has no profile.
    pub async fn increment_posted(&self, uid: &UserId) -> ProfileResult<()> {
        self.store
            .increment_stat(&StatDelta::posted(uid.clone()))
            .await
            .map_err(ProfileError::from)
    }

    /// Increments the user's completed-task counter by one.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] when the user has no profile.
    pub async fn increment_completed(&self, uid: &UserId) -> ProfileResult<()> {
        self.store
            .increment_stat(&StatDelta::completed(uid.clone()))
            .await
            .map_err(ProfileError::from)
    }
}
