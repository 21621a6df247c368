//! Domain primitives, aggregates, and services.
//!
//! Entities carry validating constructors so invalid state never leaves this
//! module; services own authorization and validation and reach persistence
//! only through the port traits in [`ports`].

pub mod auth;
pub mod authorization;
pub mod error;
pub mod identity_service;
pub mod ids;
pub mod offer;
pub mod offer_service;
pub mod order;
pub mod order_service;
pub mod ports;
pub mod review;
pub mod review_service;
pub mod stats;
pub mod stats_service;
pub mod token;
pub mod user;

pub use self::auth::{Actor, Credentials, CredentialsValidationError};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::identity_service::{
    ActivationOutcome, AuthSession, IdentityService, RegisterRequest, ResetTokenStatus,
};
pub use self::ids::{OfferDetailId, OfferId, OrderId, ReviewId, UserId};
pub use self::offer::{
    Offer, OfferDetail, OfferDetailDraft, OfferUpdate, OfferValidationError, TierKind,
};
pub use self::offer_service::OfferService;
pub use self::order::{Order, OrderStatus};
pub use self::order_service::{OrderService, OrderTarget};
pub use self::review::{Rating, Review, ReviewUpdate, ReviewValidationError};
pub use self::review_service::ReviewService;
pub use self::stats::PlatformStats;
pub use self::stats_service::StatsService;
pub use self::token::TokenSigner;
pub use self::user::{
    Email, ProfileUpdate, User, UserProfile, UserRole, UserValidationError, Username,
};

/// Convenient API result alias.
pub type ApiResult<T> = Result<T, Error>;
