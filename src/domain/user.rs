//! User profile aggregate and stat counter deltas.

use super::{ProfileValidationError, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Validated input for registering a profile at signup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProfile {
    uid: UserId,
    name: String,
    email: String,
    phone: String,
    bio: String,
}

impl NewProfile {
    /// Creates validated signup input. Phone and bio may be empty.
    ///
    /// # Errors
    ///
    /// Returns [`ProfileValidationError`] when the name or email is empty
    /// after trimming.
    pub fn new(
        uid: UserId,
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
        bio: impl Into<String>,
    ) -> Result<Self, ProfileValidationError> {
        let raw_name = name.into();
        let raw_email = email.into();
        let trimmed_name = raw_name.trim();
        let trimmed_email = raw_email.trim();

        if trimmed_name.is_empty() {
            return Err(ProfileValidationError::EmptyName);
        }
        if trimmed_email.is_empty() {
            return Err(ProfileValidationError::EmptyEmail);
        }

        Ok(Self {
            uid,
            name: trimmed_name.to_owned(),
            email: trimmed_email.to_owned(),
            phone: phone.into().trim().to_owned(),
            bio: bio.into().trim().to_owned(),
        })
    }
}

/// User profile aggregate.
///
/// Stat counters are monotonically non-decreasing: they only move through
/// [`UserProfile::apply_delta`], which increments by one per task event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    uid: UserId,
    name: String,
    email: String,
    phone: String,
    bio: String,
    rating: f32,
    tasks_posted: u64,
    tasks_completed: u64,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted profile.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedProfileData {
    /// Persisted user identifier.
    pub uid: UserId,
    /// Persisted display name.
    pub name: String,
    /// Persisted email address.
    pub email: String,
    /// Persisted phone number (may be empty).
    pub phone: String,
    /// Persisted bio (may be empty).
    pub bio: String,
    /// Persisted rating.
    pub rating: f32,
    /// Persisted posted-task counter.
    pub tasks_posted: u64,
    /// Persisted completed-task counter.
    pub tasks_completed: u64,
    /// Persisted signup timestamp.
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a profile at signup with zeroed counters and rating.
    #[must_use]
    pub fn register(new: NewProfile, clock: &impl Clock) -> Self {
        let NewProfile {
            uid,
            name,
            email,
            phone,
            bio,
        } = new;

        Self {
            uid,
            name,
            email,
            phone,
            bio,
            rating: 0.0,
            tasks_posted: 0,
            tasks_completed: 0,
            created_at: clock.utc(),
        }
    }

    /// Reconstructs a profile from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProfileData) -> Self {
        Self {
            uid: data.uid,
            name: data.name,
            email: data.email,
            phone: data.phone,
            bio: data.bio,
            rating: data.rating,
            tasks_posted: data.tasks_posted,
            tasks_completed: data.tasks_completed,
            created_at: data.created_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn uid(&self) -> &UserId {
        &self.uid
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the phone number (may be empty).
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the bio (may be empty).
    #[must_use]
    pub fn bio(&self) -> &str {
        &self.bio
    }

    /// Returns the rating.
    #[must_use]
    pub const fn rating(&self) -> f32 {
        self.rating
    }

    /// Returns how many tasks this user has posted.
    #[must_use]
    pub const fn tasks_posted(&self) -> u64 {
        self.tasks_posted
    }

    /// Returns how many accepted tasks this user has completed.
    #[must_use]
    pub const fn tasks_completed(&self) -> u64 {
        self.tasks_completed
    }

    /// Returns the signup timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Applies a counter increment. Counters never decrease.
    pub const fn apply_delta(&mut self, delta: &StatDelta) {
        match delta.field() {
            StatField::TasksPosted => self.tasks_posted = self.tasks_posted.saturating_add(1),
            StatField::TasksCompleted => {
                self.tasks_completed = self.tasks_completed.saturating_add(1);
            }
        }
    }

    /// Applies an editable-details patch. Counters, rating, email, and the
    /// signup timestamp are not editable.
    pub fn apply_update(&mut self, update: &ProfileUpdate) {
        if let Some(name) = update.name() {
            self.name = name.to_owned();
        }
        if let Some(phone) = update.phone() {
            self.phone = phone.to_owned();
        }
        if let Some(bio) = update.bio() {
            self.bio = bio.to_owned();
        }
    }
}

/// Partial update covering the editable profile details.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    name: Option<String>,
    phone: Option<String>,
    bio: Option<String>,
}

impl ProfileUpdate {
    /// Creates an empty patch.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            name: None,
            phone: None,
            bio: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    /// Sets the bio.
    #[must_use]
    pub fn with_bio(mut self, bio: impl Into<String>) -> Self {
        self.bio = Some(bio.into());
        self
    }

    /// Returns the new display name, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the new phone number, if set.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the new bio, if set.
    #[must_use]
    pub fn bio(&self) -> Option<&str> {
        self.bio.as_deref()
    }

    /// Returns whether the patch changes nothing.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.phone.is_none() && self.bio.is_none()
    }
}

/// Aggregate counter selected by a [`StatDelta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatField {
    /// Number of tasks the user has posted.
    TasksPosted,
    /// Number of accepted tasks the user has completed.
    TasksCompleted,
}

/// An increment-by-one against a user's stat counter.
///
/// Deltas are commutative: adapters must apply them as a counter operation
/// on the store side, never as a client-side read-modify-write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatDelta {
    user: UserId,
    field: StatField,
}

impl StatDelta {
    /// Increment for a newly posted task.
    #[must_use]
    pub const fn posted(user: UserId) -> Self {
        Self {
            user,
            field: StatField::TasksPosted,
        }
    }

    /// Increment for a newly completed task.
    #[must_use]
    pub const fn completed(user: UserId) -> Self {
        Self {
            user,
            field: StatField::TasksCompleted,
        }
    }

    /// Returns the user whose counter moves.
    #[must_use]
    pub const fn user(&self) -> &UserId {
        &self.user
    }

    /// Returns the counter being incremented.
    #[must_use]
    pub const fn field(&self) -> StatField {
        self.field
    }
}
