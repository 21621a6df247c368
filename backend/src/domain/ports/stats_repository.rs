//! Port abstraction for the platform-wide aggregate figures.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by stats adapters.
    pub enum StatsPersistenceError {
        Connection { message: String } => "stats repository connection failed: {message}",
        Query { message: String } => "stats repository query failed: {message}",
    }
}

/// Raw counters read in one pass over the ledgers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub review_count: u64,
    pub rating_sum: i64,
    pub business_profile_count: u64,
    pub offer_count: u64,
}

#[async_trait]
pub trait StatsRepository: Send + Sync {
    async fn collect(&self) -> Result<StatsSnapshot, StatsPersistenceError>;
}
