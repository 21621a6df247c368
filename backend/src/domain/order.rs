//! Order ledger: snapshot entities copied from a chosen offer tier.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{OrderId, UserId};
use super::offer::{Offer, OfferDetail, TierKind};

/// Order lifecycle status.
///
/// Transitions between the three values are unconstrained; only the value
/// set itself is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// Every status value, used in validation error details.
    pub const ALL: [Self; 3] = [Self::InProgress, Self::Completed, Self::Cancelled];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an order status from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOrderStatusError;

impl fmt::Display for ParseOrderStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid order status; expected in_progress, completed, or cancelled")
    }
}

impl std::error::Error for ParseOrderStatusError {}

impl FromStr for OrderStatus {
    type Err = ParseOrderStatusError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseOrderStatusError),
        }
    }
}

/// A purchase record snapshot-copied from an offer tier at creation time.
///
/// ## Invariants
/// - Holds no reference back to the offer or tier: `title`, `revisions`,
///   `delivery_time_in_days`, `price`, `features`, and `offer_type` are
///   copies frozen at creation, immune to later catalogue edits.
/// - `business_user_id` always equals the owning user of the offer the
///   snapshot was taken from, never caller input.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    id: OrderId,
    customer_user_id: UserId,
    business_user_id: UserId,
    title: String,
    revisions: i32,
    delivery_time_in_days: i32,
    price: Decimal,
    features: Vec<String>,
    offer_type: TierKind,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Order {
    /// Snapshot the given tier for a customer. The business party is taken
    /// from the offer owning the tier.
    #[must_use]
    pub fn from_detail(customer_user_id: UserId, offer: &Offer, detail: &OfferDetail) -> Self {
        let now = Utc::now();
        Self {
            id: OrderId::random(),
            customer_user_id,
            business_user_id: offer.owner_id(),
            title: detail.title().to_owned(),
            revisions: detail.revisions(),
            delivery_time_in_days: detail.delivery_time_in_days(),
            price: detail.price(),
            features: detail.features().to_vec(),
            offer_type: detail.offer_type(),
            status: OrderStatus::InProgress,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rehydrate an order from stored parts; used by persistence adapters.
    #[expect(clippy::too_many_arguments, reason = "row rehydration constructor")]
    #[must_use]
    pub fn from_parts(
        id: OrderId,
        customer_user_id: UserId,
        business_user_id: UserId,
        title: String,
        revisions: i32,
        delivery_time_in_days: i32,
        price: Decimal,
        features: Vec<String>,
        offer_type: TierKind,
        status: OrderStatus,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            customer_user_id,
            business_user_id,
            title,
            revisions,
            delivery_time_in_days,
            price,
            features,
            offer_type,
            status,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> OrderId {
        self.id
    }

    pub fn customer_user_id(&self) -> UserId {
        self.customer_user_id
    }

    pub fn business_user_id(&self) -> UserId {
        self.business_user_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn revisions(&self) -> i32 {
        self.revisions
    }

    pub fn delivery_time_in_days(&self) -> i32 {
        self.delivery_time_in_days
    }

    pub fn price(&self) -> Decimal {
        self.price
    }

    pub fn features(&self) -> &[String] {
        &self.features
    }

    pub fn offer_type(&self) -> TierKind {
        self.offer_type
    }

    pub fn status(&self) -> OrderStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// True when the user participates in this order on either side.
    #[must_use]
    pub fn involves(&self, user_id: UserId) -> bool {
        self.customer_user_id == user_id || self.business_user_id == user_id
    }

    /// Set a new status. Any recognised value is accepted from any state.
    pub fn set_status(&mut self, status: OrderStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::offer::{OfferDetailDraft, OfferUpdate};
    use rstest::rstest;

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("literal decimal")
    }

    fn drafts() -> Vec<OfferDetailDraft> {
        TierKind::ALL
            .iter()
            .enumerate()
            .map(|(i, tier)| OfferDetailDraft {
                title: format!("{tier} tier"),
                revisions: 1,
                delivery_time_in_days: 3 + 2 * i as i32,
                price: dec("100.00") * Decimal::from(i as i64 + 1),
                features: vec!["Logo".into()],
                offer_type: *tier,
            })
            .collect()
    }

    fn sample_offer() -> Offer {
        Offer::create(
            UserId::random(),
            "Web design".into(),
            "Three tiers".into(),
            None,
            drafts(),
        )
        .expect("valid offer")
    }

    #[rstest]
    #[case("in_progress", Some(OrderStatus::InProgress))]
    #[case("completed", Some(OrderStatus::Completed))]
    #[case("cancelled", Some(OrderStatus::Cancelled))]
    #[case("canceled", None)]
    #[case("bogus", None)]
    fn parses_status_strictly(#[case] raw: &str, #[case] expected: Option<OrderStatus>) {
        assert_eq!(raw.parse::<OrderStatus>().ok(), expected);
    }

    #[test]
    fn snapshot_copies_tier_and_derives_business_party() {
        let offer = sample_offer();
        let customer = UserId::random();
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let order = Order::from_detail(customer, &offer, basic);

        assert_eq!(order.customer_user_id(), customer);
        assert_eq!(order.business_user_id(), offer.owner_id());
        assert_eq!(order.price(), dec("100.00"));
        assert_eq!(order.delivery_time_in_days(), 3);
        assert_eq!(order.offer_type(), TierKind::Basic);
        assert_eq!(order.status(), OrderStatus::InProgress);
    }

    #[test]
    fn snapshot_survives_later_offer_edits() {
        let mut offer = sample_offer();
        let customer = UserId::random();
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let order = Order::from_detail(customer, &offer, basic);

        let mut replacement = drafts();
        for d in &mut replacement {
            d.price = dec("999.00");
            d.features = vec!["Everything".into()];
        }
        offer
            .apply_update(OfferUpdate {
                details: Some(replacement),
                ..OfferUpdate::default()
            })
            .expect("valid replacement");

        assert_eq!(order.price(), dec("100.00"));
        assert_eq!(order.features(), ["Logo".to_owned()].as_slice());
    }

    #[test]
    fn participant_check_covers_both_sides() {
        let offer = sample_offer();
        let customer = UserId::random();
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let order = Order::from_detail(customer, &offer, basic);

        assert!(order.involves(customer));
        assert!(order.involves(offer.owner_id()));
        assert!(!order.involves(UserId::random()));
    }

    #[test]
    fn status_transitions_are_unconstrained() {
        let offer = sample_offer();
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let mut order = Order::from_detail(UserId::random(), &offer, basic);

        order.set_status(OrderStatus::Completed);
        assert_eq!(order.status(), OrderStatus::Completed);
        // No forward-only state machine: completed may go back in progress.
        order.set_status(OrderStatus::InProgress);
        assert_eq!(order.status(), OrderStatus::InProgress);
    }
}
