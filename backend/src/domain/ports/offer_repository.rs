//! Port abstraction for offer persistence, including catalogue queries.
use async_trait::async_trait;
use pagination::PageParams;
use rust_decimal::Decimal;

use crate::domain::ids::{OfferDetailId, OfferId, UserId};
use crate::domain::offer::{Offer, OfferDetail};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by offer repository adapters.
    pub enum OfferPersistenceError {
        Connection { message: String } => "offer repository connection failed: {message}",
        Query { message: String } => "offer repository query failed: {message}",
    }
}

/// Sort key for catalogue listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OfferOrderKey {
    #[default]
    UpdatedAt,
    MinPrice,
}

/// Catalogue ordering; defaults to most recently updated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OfferOrdering {
    pub key: OfferOrderKey,
    pub descending: bool,
}

impl Default for OfferOrdering {
    fn default() -> Self {
        Self {
            key: OfferOrderKey::UpdatedAt,
            descending: true,
        }
    }
}

impl OfferOrdering {
    /// Parse a caller-supplied ordering key, `-` prefix meaning descending.
    /// Unrecognised keys fall back to the default ordering.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let (descending, key) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        match key {
            "updated_at" => Self {
                key: OfferOrderKey::UpdatedAt,
                descending,
            },
            "min_price" => Self {
                key: OfferOrderKey::MinPrice,
                descending,
            },
            _ => Self::default(),
        }
    }
}

/// Catalogue filters; all optional and combined with AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferQuery {
    pub owner_id: Option<UserId>,
    /// Case-insensitive substring match over title and description.
    pub search: Option<String>,
    /// Keep offers whose cheapest tier costs at least this much.
    pub min_price: Option<Decimal>,
    /// Keep offers whose fastest tier delivers within this many days.
    pub max_delivery_time: Option<i32>,
    pub ordering: OfferOrdering,
}

#[async_trait]
pub trait OfferRepository: Send + Sync {
    /// Insert an offer together with its three details in one transaction.
    async fn insert(&self, offer: &Offer) -> Result<(), OfferPersistenceError>;

    /// Persist an edited offer. When its detail set was replaced, the old
    /// rows are deleted and the new ones inserted in the same transaction.
    async fn update(&self, offer: &Offer) -> Result<(), OfferPersistenceError>;

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, OfferPersistenceError>;

    /// Resolve a single tier row and the offer that owns it.
    async fn find_detail(
        &self,
        id: OfferDetailId,
    ) -> Result<Option<(Offer, OfferDetail)>, OfferPersistenceError>;

    /// Delete the offer and, via cascade, its details. Returns whether a row
    /// was removed.
    async fn delete(&self, id: OfferId) -> Result<bool, OfferPersistenceError>;

    /// Filtered, ordered page of offers plus the total matching count.
    async fn list(
        &self,
        query: &OfferQuery,
        params: PageParams,
    ) -> Result<(Vec<Offer>, u64), OfferPersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("updated_at", OfferOrderKey::UpdatedAt, false)]
    #[case("-updated_at", OfferOrderKey::UpdatedAt, true)]
    #[case("min_price", OfferOrderKey::MinPrice, false)]
    #[case("-min_price", OfferOrderKey::MinPrice, true)]
    fn parses_recognised_ordering_keys(
        #[case] raw: &str,
        #[case] key: OfferOrderKey,
        #[case] descending: bool,
    ) {
        assert_eq!(OfferOrdering::parse(raw), OfferOrdering { key, descending });
    }

    #[rstest]
    #[case("price")]
    #[case("-created_at")]
    #[case("")]
    fn unknown_ordering_falls_back_to_recent_first(#[case] raw: &str) {
        assert_eq!(OfferOrdering::parse(raw), OfferOrdering::default());
    }
}
