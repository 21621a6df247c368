//! Reviews: customer feedback on business users, one per reviewer/business pair.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{ReviewId, UserId};

/// Validation failures for review fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReviewValidationError {
    #[error("rating must be between 1 and 5, got {actual}")]
    RatingOutOfRange { actual: i32 },
    #[error("a review must target a different user than its author")]
    SelfReview,
}

/// A star rating, always within `1..=5`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ToSchema,
)]
#[serde(try_from = "i32", into = "i32")]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 5;

    pub fn try_new(value: i32) -> Result<Self, ReviewValidationError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Self(value))
        } else {
            Err(ReviewValidationError::RatingOutOfRange { actual: value })
        }
    }

    #[must_use]
    pub fn value(self) -> i32 {
        self.0
    }
}

impl TryFrom<i32> for Rating {
    type Error = ReviewValidationError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<Rating> for i32 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A review left by a customer for a business user.
///
/// Uniqueness per `(business_user_id, reviewer_id)` pair is enforced at the
/// persistence layer; the entity itself only guards field validity.
#[derive(Debug, Clone, PartialEq)]
pub struct Review {
    id: ReviewId,
    business_user_id: UserId,
    reviewer_id: UserId,
    rating: Rating,
    description: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Review {
    pub fn create(
        reviewer_id: UserId,
        business_user_id: UserId,
        rating: Rating,
        description: String,
    ) -> Result<Self, ReviewValidationError> {
        if reviewer_id == business_user_id {
            return Err(ReviewValidationError::SelfReview);
        }
        let now = Utc::now();
        Ok(Self {
            id: ReviewId::random(),
            business_user_id,
            reviewer_id,
            rating,
            description,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate a review from stored parts; used by persistence adapters.
    #[must_use]
    pub fn from_parts(
        id: ReviewId,
        business_user_id: UserId,
        reviewer_id: UserId,
        rating: Rating,
        description: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            business_user_id,
            reviewer_id,
            rating,
            description,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ReviewId {
        self.id
    }

    pub fn business_user_id(&self) -> UserId {
        self.business_user_id
    }

    pub fn reviewer_id(&self) -> UserId {
        self.reviewer_id
    }

    pub fn rating(&self) -> Rating {
        self.rating
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Apply a partial edit; absent fields keep their value.
    pub fn apply_update(&mut self, update: ReviewUpdate) {
        if let Some(rating) = update.rating {
            self.rating = rating;
        }
        if let Some(description) = update.description {
            self.description = description;
        }
        self.updated_at = Utc::now();
    }
}

/// Partial review edit. Only rating and description are editable; the
/// reviewer and target are fixed for the lifetime of the review.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReviewUpdate {
    pub rating: Option<Rating>,
    pub description: Option<String>,
}
