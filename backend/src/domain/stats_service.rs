//! Platform aggregate stats, assembled from one pass over the ledgers.

use std::sync::Arc;

use crate::domain::error::Error;
use crate::domain::ports::{StatsPersistenceError, StatsRepository};
use crate::domain::stats::PlatformStats;

pub struct StatsService {
    stats: Arc<dyn StatsRepository>,
}

impl StatsService {
    pub fn new(stats: Arc<dyn StatsRepository>) -> Self {
        Self { stats }
    }

    pub async fn stats(&self) -> Result<PlatformStats, Error> {
        let snapshot = self.stats.collect().await.map_err(|error| match error {
            StatsPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("stats repository unavailable: {message}"))
            }
            StatsPersistenceError::Query { message } => {
                Error::internal(format!("stats repository error: {message}"))
            }
        })?;
        Ok(PlatformStats::from_counts(
            snapshot.review_count,
            snapshot.rating_sum,
            snapshot.business_profile_count,
            snapshot.offer_count,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::StatsSnapshot;
    use async_trait::async_trait;

    struct FixedStats(StatsSnapshot);

    #[async_trait]
    impl StatsRepository for FixedStats {
        async fn collect(&self) -> Result<StatsSnapshot, StatsPersistenceError> {
            Ok(self.0)
        }
    }

    #[tokio::test]
    async fn assembles_snapshot_into_rounded_stats() {
        let service = StatsService::new(Arc::new(FixedStats(StatsSnapshot {
            review_count: 3,
            rating_sum: 13,
            business_profile_count: 5,
            offer_count: 9,
        })));
        let stats = service.stats().await.expect("stats");
        assert!((stats.average_rating - 4.3).abs() < f64::EPSILON);
        assert_eq!(stats.offer_count, 9);
    }

    #[tokio::test]
    async fn empty_platform_reports_zero_average() {
        let service = StatsService::new(Arc::new(FixedStats(StatsSnapshot::default())));
        let stats = service.stats().await.expect("stats");
        assert_eq!(stats.average_rating, 0.0);
        assert_eq!(stats.review_count, 0);
    }
}
