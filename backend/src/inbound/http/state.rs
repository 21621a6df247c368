//! Shared HTTP adapter state.
//!
//! Handlers receive the domain services via `actix_web::web::Data` so the
//! adapter stays free of persistence concerns and remains testable with
//! in-memory repositories.

use std::sync::Arc;

use crate::domain::{IdentityService, OfferService, OrderService, ReviewService, StatsService};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub identity: Arc<IdentityService>,
    pub offers: Arc<OfferService>,
    pub orders: Arc<OrderService>,
    pub reviews: Arc<ReviewService>,
    pub stats: Arc<StatsService>,
}
