//! Port abstraction for review persistence.
use async_trait::async_trait;

use crate::domain::ids::{ReviewId, UserId};
use crate::domain::review::Review;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by review repository adapters.
    pub enum ReviewPersistenceError {
        Connection { message: String } => "review repository connection failed: {message}",
        Query { message: String } => "review repository query failed: {message}",
        /// The reviewer already reviewed this business user.
        DuplicatePair => "a review for this business user already exists",
    }
}

/// Sort key for review listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReviewOrderKey {
    #[default]
    UpdatedAt,
    Rating,
}

/// Review listing order; defaults to most recently updated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewOrdering {
    pub key: ReviewOrderKey,
    pub descending: bool,
}

impl Default for ReviewOrdering {
    fn default() -> Self {
        Self {
            key: ReviewOrderKey::UpdatedAt,
            descending: true,
        }
    }
}

impl ReviewOrdering {
    /// Parse a caller-supplied ordering key, `-` prefix meaning descending.
    /// Unrecognised keys fall back to the default ordering.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (descending, key) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        match key {
            "updated_at" => Self {
                key: ReviewOrderKey::UpdatedAt,
                descending,
            },
            "rating" => Self {
                key: ReviewOrderKey::Rating,
                descending,
            },
            _ => Self::default(),
        }
    }
}

/// Listing filters; both optional and combined with AND.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewQuery {
    pub business_user_id: Option<UserId>,
    pub reviewer_id: Option<UserId>,
    pub ordering: ReviewOrdering,
}

#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Insert a review. Fails with [`ReviewPersistenceError::DuplicatePair`]
    /// when the (business user, reviewer) pair already has one.
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError>;

    async fn update(&self, review: &Review) -> Result<(), ReviewPersistenceError>;

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Fetch a review only when `reviewer_id` authored it. Combining the
    /// existence and ownership predicates keeps non-owners from learning
    /// whether the id exists.
    async fn find_for_reviewer(
        &self,
        id: ReviewId,
        reviewer_id: UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError>;

    /// Delete a review scoped to its author; returns whether a row matched.
    async fn delete_for_reviewer(
        &self,
        id: ReviewId,
        reviewer_id: UserId,
    ) -> Result<bool, ReviewPersistenceError>;

    /// Unscoped delete, reserved for staff. Returns whether a row matched.
    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewPersistenceError>;

    async fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, ReviewPersistenceError>;
}
