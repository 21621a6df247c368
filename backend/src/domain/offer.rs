//! Offer catalogue aggregate: offers and their three fixed pricing tiers.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{OfferDetailId, OfferId, UserId};

/// The fixed three-way partition of an offer's pricing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TierKind {
    Basic,
    Standard,
    Premium,
}

impl TierKind {
    /// Every tier kind, in canonical order.
    pub const ALL: [Self; 3] = [Self::Basic, Self::Standard, Self::Premium];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Standard => "standard",
            Self::Premium => "premium",
        }
    }
}

impl fmt::Display for TierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a tier kind from string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseTierKindError;

impl fmt::Display for ParseTierKindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid tier kind; expected basic, standard, or premium")
    }
}

impl std::error::Error for ParseTierKindError {}

impl FromStr for TierKind {
    type Err = ParseTierKindError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "basic" => Ok(Self::Basic),
            "standard" => Ok(Self::Standard),
            "premium" => Ok(Self::Premium),
            _ => Err(ParseTierKindError),
        }
    }
}

/// Sentinel revision count meaning "unlimited revisions".
pub const UNLIMITED_REVISIONS: i32 = -1;

/// Validation errors raised while assembling offers and their tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OfferValidationError {
    EmptyTitle,
    EmptyDescription,
    WrongDetailCount { actual: usize },
    DuplicateTier { tier: TierKind },
    MissingTier { tier: TierKind },
    EmptyDetailTitle,
    RevisionsBelowMinimum { actual: i32 },
    NonPositiveDeliveryTime { actual: i32 },
    NegativePrice,
    PriceTooPrecise,
    EmptyFeatures,
}

impl fmt::Display for OfferValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "offer title must not be empty"),
            Self::EmptyDescription => write!(f, "offer description must not be empty"),
            Self::WrongDetailCount { actual } => {
                write!(f, "exactly 3 offer details are required, got {actual}")
            }
            Self::DuplicateTier { tier } => {
                write!(f, "duplicate offer detail for tier {tier}")
            }
            Self::MissingTier { tier } => {
                write!(f, "missing offer detail for tier {tier}")
            }
            Self::EmptyDetailTitle => write!(f, "offer detail title must not be empty"),
            Self::RevisionsBelowMinimum { actual } => write!(
                f,
                "revisions must be {UNLIMITED_REVISIONS} (unlimited) or greater, got {actual}"
            ),
            Self::NonPositiveDeliveryTime { actual } => {
                write!(f, "delivery time must be a positive number of days, got {actual}")
            }
            Self::NegativePrice => write!(f, "price must not be negative"),
            Self::PriceTooPrecise => write!(f, "price supports at most 2 decimal places"),
            Self::EmptyFeatures => write!(f, "feature list must not be empty"),
        }
    }
}

impl std::error::Error for OfferValidationError {}

/// Caller-supplied tier payload, before ids and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OfferDetailDraft {
    pub title: String,
    /// `-1` means unlimited revisions; any other value must be `>= 0`.
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[schema(value_type = f64, example = 99.5)]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: TierKind,
}

impl OfferDetailDraft {
    fn validate(&self) -> Result<(), OfferValidationError> {
        if self.title.trim().is_empty() {
            return Err(OfferValidationError::EmptyDetailTitle);
        }
        if self.revisions < UNLIMITED_REVISIONS {
            return Err(OfferValidationError::RevisionsBelowMinimum {
                actual: self.revisions,
            });
        }
        if self.delivery_time_in_days <= 0 {
            return Err(OfferValidationError::NonPositiveDeliveryTime {
                actual: self.delivery_time_in_days,
            });
        }
        if self.price.is_sign_negative() {
            return Err(OfferValidationError::NegativePrice);
        }
        if self.price.round_dp(2) != self.price {
            return Err(OfferValidationError::PriceTooPrecise);
        }
        if self.features.is_empty() {
            return Err(OfferValidationError::EmptyFeatures);
        }
        Ok(())
    }
}

/// One pricing tier of an offer.
#[derive(Debug, Clone, PartialEq)]
pub struct OfferDetail {
    id: OfferDetailId,
    title: String,
    revisions: i32,
    delivery_time_in_days: i32,
    price: Decimal,
    features: Vec<String>,
    offer_type: TierKind,
}

impl OfferDetail {
    /// Validate a draft and assign it a fresh identifier.
    pub fn from_draft(draft: OfferDetailDraft) -> Result<Self, OfferValidationError> {
        draft.validate()?;
        Ok(Self {
            id: OfferDetailId::random(),
            title: draft.title,
            revisions: draft.revisions,
            delivery_time_in_days: draft.delivery_time_in_days,
            price: draft.price,
            features: draft.features,
            offer_type: draft.offer_type,
        })
    }

    /// Rehydrate a tier from stored parts; used by persistence adapters.
    #[must_use]
    pub fn from_parts(
        id: OfferDetailId,
        title: String,
        revisions: i32,
        delivery_time_in_days: i32,
        price: Decimal,
        features: Vec<String>,
        offer_type: TierKind,
    ) -> Self {
        Self {
            id,
            title,
            revisions,
            delivery_time_in_days,
            price,
            features,
            offer_type,
        }
    }

    pub fn id(&self) -> OfferDetailId {
        self.id
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
}

/// Validate that a detail set covers exactly {basic, standard, premium}.
pub fn validate_tier_set(drafts: &[OfferDetailDraft]) -> Result<(), OfferValidationError> {
    if drafts.len() != 3 {
        return Err(OfferValidationError::WrongDetailCount {
            actual: drafts.len(),
        });
    }
    for tier in TierKind::ALL {
        match drafts.iter().filter(|d| d.offer_type == tier).count() {
            0 => return Err(OfferValidationError::MissingTier { tier }),
            1 => {}
            _ => return Err(OfferValidationError::DuplicateTier { tier }),
        }
    }
    Ok(())
}

/// A seller's service listing with exactly three pricing tiers.
///
/// ## Invariants
/// - `details` always holds one tier per [`TierKind`], no more, no fewer.
/// - Only the owning business user may mutate the offer.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    id: OfferId,
    owner_id: UserId,
    title: String,
    description: String,
    image: Option<String>,
    details: Vec<OfferDetail>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Offer {
    /// Assemble a new offer from caller input, validating the tier set.
    pub fn create(
        owner_id: UserId,
        title: String,
        description: String,
        image: Option<String>,
        drafts: Vec<OfferDetailDraft>,
    ) -> Result<Self, OfferValidationError> {
        if title.trim().is_empty() {
            return Err(OfferValidationError::EmptyTitle);
        }
        if description.trim().is_empty() {
            return Err(OfferValidationError::EmptyDescription);
        }
        validate_tier_set(&drafts)?;
        let details = drafts
            .into_iter()
            .map(OfferDetail::from_draft)
            .collect::<Result<Vec<_>, _>>()?;
        let now = Utc::now();
        Ok(Self {
            id: OfferId::random(),
            owner_id,
            title,
            description,
            image,
            details,
            created_at: now,
            updated_at: now,
        })
    }

    /// Rehydrate an offer from stored parts; used by persistence adapters.
    #[expect(clippy::too_many_arguments, reason = "row rehydration constructor")]
    #[must_use]
    pub fn from_parts(
        id: OfferId,
        owner_id: UserId,
        title: String,
        description: String,
        image: Option<String>,
        details: Vec<OfferDetail>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            owner_id,
            title,
            description,
            image,
            details,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> OfferId {
        self.id
    }

    pub fn owner_id(&self) -> UserId {
        self.owner_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn details(&self) -> &[OfferDetail] {
        &self.details
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The tier with the given kind. The three-tier invariant makes this
    /// lookup infallible for constructed offers.
    pub fn detail(&self, tier: TierKind) -> Option<&OfferDetail> {
        self.details.iter().find(|d| d.offer_type == tier)
    }

    /// Minimum price across the current tiers, recomputed on every call.
    #[must_use]
    pub fn min_price(&self) -> Decimal {
        self.details
            .iter()
            .map(OfferDetail::price)
            .min()
            .unwrap_or(Decimal::ZERO)
    }

    /// Minimum delivery time across the current tiers.
    #[must_use]
    pub fn min_delivery_time(&self) -> i32 {
        self.details
            .iter()
            .map(OfferDetail::delivery_time_in_days)
            .min()
            .unwrap_or(0)
    }

    /// Apply a partial update. When `details` is present the entire tier set
    /// is replaced; otherwise the existing tiers are left untouched.
    pub fn apply_update(&mut self, update: OfferUpdate) -> Result<(), OfferValidationError> {
        let OfferUpdate {
            title,
            description,
            image,
            details,
        } = update;
        if let Some(title) = title {
            if title.trim().is_empty() {
                return Err(OfferValidationError::EmptyTitle);
            }
            self.title = title;
        }
        if let Some(description) = description {
            if description.trim().is_empty() {
                return Err(OfferValidationError::EmptyDescription);
            }
            self.description = description;
        }
        if let Some(image) = image {
            self.image = image;
        }
        if let Some(drafts) = details {
            validate_tier_set(&drafts)?;
            self.details = drafts
                .into_iter()
                .map(OfferDetail::from_draft)
                .collect::<Result<Vec<_>, _>>()?;
        }
        self.updated_at = Utc::now();
        Ok(())
    }
}

/// Partial offer update payload.
///
/// `image` is doubly optional: `None` leaves the image untouched while
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OfferUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<Option<String>>,
    pub details: Option<Vec<OfferDetailDraft>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("literal decimal")
    }

    fn draft(tier: TierKind, price: Decimal, delivery: i32) -> OfferDetailDraft {
        OfferDetailDraft {
            title: format!("{tier} tier"),
            revisions: 2,
            delivery_time_in_days: delivery,
            price,
            features: vec!["Logo".into()],
            offer_type: tier,
        }
    }

    fn three_drafts() -> Vec<OfferDetailDraft> {
        vec![
            draft(TierKind::Basic, dec("100.00"), 3),
            draft(TierKind::Standard, dec("200.00"), 5),
            draft(TierKind::Premium, dec("300.00"), 7),
        ]
    }

    fn sample_offer() -> Offer {
        Offer::create(
            UserId::random(),
            "Web design".into(),
            "Three tiers of web design".into(),
            None,
            three_drafts(),
        )
        .expect("valid offer")
    }

    #[rstest]
    #[case("basic", Some(TierKind::Basic))]
    #[case("premium", Some(TierKind::Premium))]
    #[case("Basic", None)]
    #[case("gold", None)]
    fn parses_tier_kinds_strictly(#[case] raw: &str, #[case] expected: Option<TierKind>) {
        assert_eq!(raw.parse::<TierKind>().ok(), expected);
    }

    #[test]
    fn accepts_exactly_the_three_tiers() {
        let offer = sample_offer();
        assert_eq!(offer.details().len(), 3);
        for tier in TierKind::ALL {
            assert!(offer.detail(tier).is_some(), "missing {tier}");
        }
    }

    #[rstest]
    #[case(0)]
    #[case(2)]
    #[case(4)]
    fn rejects_wrong_detail_counts(#[case] count: usize) {
        let mut drafts = three_drafts();
        drafts.truncate(count);
        while drafts.len() < count {
            drafts.push(draft(TierKind::Premium, dec("1.00"), 1));
        }
        assert_eq!(
            validate_tier_set(&drafts),
            Err(OfferValidationError::WrongDetailCount { actual: count })
        );
    }

    #[test]
    fn rejects_duplicate_tiers() {
        let drafts = vec![
            draft(TierKind::Basic, dec("1.00"), 1),
            draft(TierKind::Basic, dec("2.00"), 2),
            draft(TierKind::Premium, dec("3.00"), 3),
        ];
        // Tier counts are checked in canonical order, so the doubled basic
        // tier is reported before the missing standard one.
        assert_eq!(
            validate_tier_set(&drafts),
            Err(OfferValidationError::DuplicateTier {
                tier: TierKind::Basic
            })
        );
    }

    #[rstest]
    #[case(-1, true)]
    #[case(0, true)]
    #[case(5, true)]
    #[case(-2, false)]
    fn enforces_revision_floor(#[case] revisions: i32, #[case] ok: bool) {
        let mut d = draft(TierKind::Basic, dec("1.00"), 1);
        d.revisions = revisions;
        assert_eq!(d.validate().is_ok(), ok, "revisions = {revisions}");
    }

    #[rstest]
    #[case(0)]
    #[case(-3)]
    fn rejects_non_positive_delivery(#[case] days: i32) {
        let mut d = draft(TierKind::Basic, dec("1.00"), 1);
        d.delivery_time_in_days = days;
        assert_eq!(
            d.validate(),
            Err(OfferValidationError::NonPositiveDeliveryTime { actual: days })
        );
    }

    #[test]
    fn rejects_bad_prices_and_empty_features() {
        let mut d = draft(TierKind::Basic, dec("-1.00"), 1);
        assert_eq!(d.validate(), Err(OfferValidationError::NegativePrice));
        d.price = dec("1.005");
        assert_eq!(d.validate(), Err(OfferValidationError::PriceTooPrecise));
        d.price = dec("1.00");
        d.features.clear();
        assert_eq!(d.validate(), Err(OfferValidationError::EmptyFeatures));
    }

    #[test]
    fn min_price_and_delivery_track_current_details() {
        let mut offer = sample_offer();
        assert_eq!(offer.min_price(), dec("100.00"));
        assert_eq!(offer.min_delivery_time(), 3);

        let replacement = vec![
            draft(TierKind::Basic, dec("150.00"), 4),
            draft(TierKind::Standard, dec("90.00"), 10),
            draft(TierKind::Premium, dec("500.00"), 14),
        ];
        offer
            .apply_update(OfferUpdate {
                details: Some(replacement),
                ..OfferUpdate::default()
            })
            .expect("valid replacement");
        assert_eq!(offer.min_price(), dec("90.00"));
        assert_eq!(offer.min_delivery_time(), 4);
    }

    #[test]
    fn update_without_details_keeps_tiers() {
        let mut offer = sample_offer();
        let before = offer.details().to_vec();
        offer
            .apply_update(OfferUpdate {
                title: Some("Renamed".into()),
                ..OfferUpdate::default()
            })
            .expect("valid update");
        assert_eq!(offer.title(), "Renamed");
        assert_eq!(offer.details(), before.as_slice());
    }

    #[test]
    fn update_with_invalid_details_is_rejected() {
        let mut offer = sample_offer();
        let mut drafts = three_drafts();
        drafts.pop();
        assert_eq!(
            offer.apply_update(OfferUpdate {
                details: Some(drafts),
                ..OfferUpdate::default()
            }),
            Err(OfferValidationError::WrongDetailCount { actual: 2 })
        );
    }
}
