//! PostgreSQL-backed `ReviewRepository` implementation using Diesel.
//!
//! The one-review-per-pair rule rides on the unique index over
//! `(business_user_id, reviewer_id)`; a violation surfaces as
//! [`ReviewPersistenceError::DuplicatePair`]. The reviewer-scoped lookups
//! put both predicates in one WHERE clause so a miss cannot reveal whether
//! the id exists.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ids::{ReviewId, UserId};
use crate::domain::review::{Rating, Review};
use crate::domain::ports::{
    ReviewOrderKey, ReviewPersistenceError, ReviewQuery, ReviewRepository,
};

use super::models::{NewReviewRow, ReviewRow};
use super::pool::{DbPool, PoolError};
use super::schema::reviews;

#[derive(Clone)]
pub struct DieselReviewRepository {
    pool: DbPool,
}

impl DieselReviewRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ReviewPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            ReviewPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> ReviewPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
            ReviewPersistenceError::duplicate_pair()
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            ReviewPersistenceError::connection("database connection error")
        }
        _ => ReviewPersistenceError::query("database error"),
    }
}

fn row_to_review(row: ReviewRow) -> Result<Review, ReviewPersistenceError> {
    let rating = Rating::try_new(row.rating)
        .map_err(|_| ReviewPersistenceError::query("corrupt rating column"))?;
    Ok(Review::from_parts(
        ReviewId::from_uuid(row.id),
        UserId::from_uuid(row.business_user_id),
        UserId::from_uuid(row.reviewer_id),
        rating,
        row.description,
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl ReviewRepository for DieselReviewRepository {
    async fn insert(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewReviewRow {
            id: review.id().as_uuid(),
            business_user_id: review.business_user_id().as_uuid(),
            reviewer_id: review.reviewer_id().as_uuid(),
            rating: review.rating().value(),
            description: review.description(),
            created_at: review.created_at(),
            updated_at: review.updated_at(),
        };
        diesel::insert_into(reviews::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, review: &Review) -> Result<(), ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(reviews::table.find(review.id().as_uuid()))
            .set((
                reviews::rating.eq(review.rating().value()),
                reviews::description.eq(review.description()),
                reviews::updated_at.eq(review.updated_at()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: ReviewId) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reviews::table
            .find(id.as_uuid())
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_review).transpose()
    }

    async fn find_for_reviewer(
        &self,
        id: ReviewId,
        reviewer_id: UserId,
    ) -> Result<Option<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = reviews::table
            .find(id.as_uuid())
            .filter(reviews::reviewer_id.eq(reviewer_id.as_uuid()))
            .select(ReviewRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_review).transpose()
    }

    async fn delete_for_reviewer(
        &self,
        id: ReviewId,
        reviewer_id: UserId,
    ) -> Result<bool, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(
            reviews::table
                .find(id.as_uuid())
                .filter(reviews::reviewer_id.eq(reviewer_id.as_uuid())),
        )
        .execute(&mut conn)
        .await
        .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn delete(&self, id: ReviewId) -> Result<bool, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(reviews::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list(&self, query: &ReviewQuery) -> Result<Vec<Review>, ReviewPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut sql = reviews::table.into_boxed();
        if let Some(business_user_id) = query.business_user_id {
            sql = sql.filter(reviews::business_user_id.eq(business_user_id.as_uuid()));
        }
        if let Some(reviewer_id) = query.reviewer_id {
            sql = sql.filter(reviews::reviewer_id.eq(reviewer_id.as_uuid()));
        }
        sql = match (query.ordering.key, query.ordering.descending) {
            (ReviewOrderKey::UpdatedAt, true) => sql.order(reviews::updated_at.desc()),
            (ReviewOrderKey::UpdatedAt, false) => sql.order(reviews::updated_at.asc()),
            (ReviewOrderKey::Rating, true) => sql.order(reviews::rating.desc()),
            (ReviewOrderKey::Rating, false) => sql.order(reviews::rating.asc()),
        };
        let rows: Vec<ReviewRow> = sql
            .select(ReviewRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_review).collect()
    }
}
