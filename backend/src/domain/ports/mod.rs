//! Outbound port traits the domain services depend on.
//!
//! Adapters live under `crate::outbound`; services hold `Arc<dyn Port>`s so
//! tests can substitute in-memory stubs.

mod macros;
mod mailer;
mod offer_repository;
mod order_repository;
mod password_reset_repository;
mod review_repository;
mod stats_repository;
mod user_repository;

pub(crate) use macros::define_port_error;
pub use mailer::{Mailer, MailerError};
pub use offer_repository::{
    OfferOrderKey, OfferOrdering, OfferPersistenceError, OfferQuery, OfferRepository,
};
pub use order_repository::{OrderPersistenceError, OrderRepository};
pub use password_reset_repository::{
    PasswordReset, PasswordResetPersistenceError, PasswordResetRepository,
};
pub use review_repository::{
    ReviewOrderKey, ReviewOrdering, ReviewPersistenceError, ReviewQuery, ReviewRepository,
};
pub use stats_repository::{StatsPersistenceError, StatsRepository, StatsSnapshot};
pub use user_repository::{UserPersistenceError, UserRepository};
