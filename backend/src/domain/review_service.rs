//! Review ledger operations.
//!
//! Update and delete fold the ownership check into the existence check, so a
//! non-owner probing an id learns nothing: both cases come back `not_found`.
//! Staff keep an unmasked delete path.

use std::sync::Arc;

use crate::domain::auth::Actor;
use crate::domain::authorization::{self, Action};
use crate::domain::error::Error;
use crate::domain::ids::{ReviewId, UserId};
use crate::domain::review::{Rating, Review, ReviewUpdate};
use crate::domain::ports::{
    ReviewPersistenceError, ReviewQuery, ReviewRepository, UserPersistenceError, UserRepository,
};
use crate::domain::user::UserRole;

pub struct ReviewService {
    reviews: Arc<dyn ReviewRepository>,
    users: Arc<dyn UserRepository>,
}

impl ReviewService {
    pub fn new(reviews: Arc<dyn ReviewRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { reviews, users }
    }

    fn map_review_error(error: ReviewPersistenceError) -> Error {
        match error {
            ReviewPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("review repository unavailable: {message}"))
            }
            ReviewPersistenceError::Query { message } => {
                Error::internal(format!("review repository error: {message}"))
            }
            ReviewPersistenceError::DuplicatePair => {
                Error::conflict("you have already reviewed this business user")
            }
        }
    }

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            other => Error::internal(format!("user repository error: {other}")),
        }
    }

    pub async fn list_reviews(&self, query: &ReviewQuery) -> Result<Vec<Review>, Error> {
        self.reviews
            .list(query)
            .await
            .map_err(Self::map_review_error)
    }

    pub async fn get_review(&self, id: ReviewId) -> Result<Review, Error> {
        self.reviews
            .find_by_id(id)
            .await
            .map_err(Self::map_review_error)?
            .ok_or_else(|| Error::not_found("review not found"))
    }

    /// Leave a review for a business user. The author is always the caller;
    /// a second review for the same pair is a conflict, not a validation
    /// failure.
    pub async fn create_review(
        &self,
        actor: &Actor,
        business_user_id: UserId,
        rating: Rating,
        description: String,
    ) -> Result<Review, Error> {
        authorization::require(actor, Action::CreateReview)?;
        let subject = self
            .users
            .find_by_id(business_user_id)
            .await
            .map_err(Self::map_user_error)?;
        match subject {
            Some(user) if user.role() == UserRole::Business => {}
            _ => return Err(Error::not_found("business user not found")),
        }

        let review = Review::create(actor.id, business_user_id, rating, description)
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        self.reviews
            .insert(&review)
            .await
            .map_err(Self::map_review_error)?;
        Ok(review)
    }

    /// Edit rating and/or description. Non-owners get `not_found` whether or
    /// not the id exists.
    pub async fn update_review(
        &self,
        actor: &Actor,
        id: ReviewId,
        update: ReviewUpdate,
    ) -> Result<Review, Error> {
        let mut review = self
            .reviews
            .find_for_reviewer(id, actor.id)
            .await
            .map_err(Self::map_review_error)?
            .ok_or_else(|| Error::not_found("review not found"))?;
        review.apply_update(update);
        self.reviews
            .update(&review)
            .await
            .map_err(Self::map_review_error)?;
        Ok(review)
    }

    /// Delete a review. Owners use the masked path; staff may delete any
    /// review by id.
    pub async fn delete_review(&self, actor: &Actor, id: ReviewId) -> Result<(), Error> {
        let removed = if actor.is_staff {
            self.reviews
                .delete(id)
                .await
                .map_err(Self::map_review_error)?
        } else {
            self.reviews
                .delete_for_reviewer(id, actor.id)
                .await
                .map_err(Self::map_review_error)?
        };
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("review not found"))
        }
    }
}
