//! Platform-wide aggregate figures, computed on demand.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Counters and the average review rating across the whole platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PlatformStats {
    pub review_count: u64,
    /// Mean rating rounded to one decimal place, `0.0` when no reviews exist.
    pub average_rating: f64,
    pub business_profile_count: u64,
    pub offer_count: u64,
}

impl PlatformStats {
    /// Build the aggregate from raw counts and the summed rating total.
    #[must_use]
    pub fn from_counts(
        review_count: u64,
        rating_sum: i64,
        business_profile_count: u64,
        offer_count: u64,
    ) -> Self {
        Self {
            review_count,
            average_rating: round_average(rating_sum, review_count),
            business_profile_count,
            offer_count,
        }
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "rating sums stay far below f64 integer precision"
)]
fn round_average(rating_sum: i64, review_count: u64) -> f64 {
    if review_count == 0 {
        return 0.0;
    }
    let mean = rating_sum as f64 / review_count as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 0.0)]
    #[case(13, 3, 4.3)]
    #[case(10, 4, 2.5)]
    #[case(5, 1, 5.0)]
    #[case(7, 3, 2.3)]
    fn rounds_average_to_one_decimal(
        #[case] rating_sum: i64,
        #[case] review_count: u64,
        #[case] expected: f64,
    ) {
        let stats = PlatformStats::from_counts(review_count, rating_sum, 0, 0);
        assert!((stats.average_rating - expected).abs() < f64::EPSILON);
    }

    #[test]
    fn carries_counts_through() {
        let stats = PlatformStats::from_counts(4, 16, 7, 12);
        assert_eq!(stats.review_count, 4);
        assert_eq!(stats.business_profile_count, 7);
        assert_eq!(stats.offer_count, 12);
    }
}
