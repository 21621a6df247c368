//! Diesel-backed adapters for the domain's persistence ports.

mod diesel_offer_repository;
mod diesel_order_repository;
mod diesel_password_reset_repository;
mod diesel_review_repository;
mod diesel_stats_repository;
mod diesel_user_repository;
mod models;
pub mod pool;
pub mod schema;

pub use diesel_offer_repository::DieselOfferRepository;
pub use diesel_order_repository::DieselOrderRepository;
pub use diesel_password_reset_repository::DieselPasswordResetRepository;
pub use diesel_review_repository::DieselReviewRepository;
pub use diesel_stats_repository::DieselStatsRepository;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
