//! Profile registration, edits, and lookup.

use crate::domain::{
    InvalidUserId, NewProfile, ProfileUpdate, ProfileValidationError, UserId, UserProfile,
};
use crate::ports::{MarketplaceStore, ProfileWatch, StoreError};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;

/// Request payload for registering a profile at signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterProfileRequest {
    uid: String,
    name: String,
    email: String,
    phone: String,
    bio: String,
}

impl RegisterProfileRequest {
    /// Creates a request with the required identity fields.
    #[must_use]
    pub fn new(uid: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            name: name.into(),
            email: email.into(),
            phone: String::new(),
            bio: String::new(),
        }
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = phone.into();
        self
    }

    /// Sets the bio.
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = bio.into();
        self
    }
}

/// Service-level errors for profile operations.
#[derive(Debug, Clone, Error)]
pub enum ProfileError {
    /// Bad input, caught before any store call.
    #[error(transparent)]
    Validation(#[from] ProfileValidationError),

    /// The supplied user identifier is empty.
    #[error(transparent)]
    InvalidUser(#[from] InvalidUserId),

    /// A profile for the user already exists.
    #[error("user {0} is already registered")]
    AlreadyRegistered(UserId),

    /// The referenced profile does not exist.
    #[error("no profile registered for user {0}")]
    NotFound(UserId),

    /// The store aborted the operation. Safe to retry.
    #[error("operation aborted: {0}")]
    Aborted(String),

    /// The store is unreachable or misbehaving.
    #[error("store unavailable: {0}")]
    Transport(#[source] Arc<dyn std::error::Error + Send + Sync>),
}

impl From<StoreError> for ProfileError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::ProfileNotFound(uid) => Self::NotFound(uid),
            StoreError::DuplicateProfile(uid) => Self::AlreadyRegistered(uid),
            StoreError::Aborted(reason) => Self::Aborted(reason),
            StoreError::Persistence(source) => Self::Transport(source),
            // Task-scoped store errors cannot arise from profile operations.
            other => Self::Aborted(other.to_string()),
        }
    }
}

/// Result type for profile service operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

/// Profile orchestration service.
#[derive(Clone)]
pub struct ProfileService<S, C>
where
    S: MarketplaceStore,
    C: Clock + Send + Sync,
{
    store: Arc<S>,
    clock: Arc<C>,
}

impl<S, C> ProfileService<S, C>
where
    S: MarketplaceStore,
    C: Clock + Send + Sync,
{
    /// Creates a new profile service.
    #[must_use]
    pub const fn new(store: Arc<S>, clock: Arc<C>) -> Self {
        Self { store, clock }
    }

    /// Registers a profile at signup with zeroed stat counters.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::Validation`] or [`ProfileError::InvalidUser`]
    /// before any store call, and [`ProfileError::AlreadyRegistered`] when
    /// the user already has a profile.
    pub async fn register(&self, request: RegisterProfileRequest) -> ProfileResult<UserProfile> {
        let RegisterProfileRequest {
            uid,
            name,
            email,
            phone,
            bio,
        } = request;

        let user = UserId::new(uid)?;
        let new_profile = NewProfile::new(user, name, email, phone, bio)?;
        let profile = UserProfile::register(new_profile, &*self.clock);

        self.store.insert_profile(&profile).await?;
        tracing::info!(uid = %profile.uid(), "profile registered");
        Ok(profile)
    }

    /// Applies an editable-details patch (name, phone, bio) and returns the
    /// updated profile. Counters, rating, and email are not editable here.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileError::NotFound`] when the profile does not exist.
    pub async fn update_details(
        &self,
        uid: &UserId,
        update: ProfileUpdate,
    ) -> ProfileResult<UserProfile> {
        let updated = self.store.update_profile(uid, update).await?;
        tracing::info!(uid = %uid, "profile updated");
        Ok(updated)
    }

    /// Retrieves a profile by user identifier. Returns `Ok(None)` when the
    /// user has no profile.
    ///
    /// # Errors
    ///
    /// Returns store-mapped errors when the lookup fails.
    pub async fn profile(&self, uid: &UserId) -> ProfileResult<Option<UserProfile>> {
        Ok(self.store.get_profile(uid).await?)
    }

    /// Subscribes to a profile's change stream. Dropping the handle releases
    /// the subscription.
    ///
    /// # Errors
    ///
    /// Returns store-mapped errors when the subscription cannot be
    /// established.
    pub async fn watch(&self, uid: &UserId) -> ProfileResult<ProfileWatch> {
        Ok(self.store.watch_profile(uid).await?)
    }
}
