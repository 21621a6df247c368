//! PostgreSQL-backed `StatsRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::dsl::sum;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{StatsPersistenceError, StatsRepository, StatsSnapshot};
use crate::domain::user::UserRole;

use super::pool::{DbPool, PoolError};
use super::schema::{offers, reviews, users};

#[derive(Clone)]
pub struct DieselStatsRepository {
    pool: DbPool,
}

impl DieselStatsRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> StatsPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StatsPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> StatsPersistenceError {
    debug!(%error, "diesel operation failed");
    StatsPersistenceError::query("database error")
}

#[expect(clippy::cast_sign_loss, reason = "COUNT(*) is never negative")]
#[async_trait]
impl StatsRepository for DieselStatsRepository {
    async fn collect(&self) -> Result<StatsSnapshot, StatsPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let review_count: i64 = reviews::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let rating_sum: Option<i64> = reviews::table
            .select(sum(reviews::rating))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let business_profile_count: i64 = users::table
            .filter(users::role.eq(UserRole::Business.to_string()))
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        let offer_count: i64 = offers::table
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(StatsSnapshot {
            review_count: review_count as u64,
            rating_sum: rating_sum.unwrap_or(0),
            business_profile_count: business_profile_count as u64,
            offer_count: offer_count as u64,
        })
    }
}
