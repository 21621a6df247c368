//! Catalogue operations: listing, reading, and mutating offers.

use std::sync::Arc;

use pagination::{Page, PageParams};

use crate::domain::auth::Actor;
use crate::domain::authorization::{self, Action};
use crate::domain::error::Error;
use crate::domain::ids::{OfferDetailId, OfferId};
use crate::domain::offer::{Offer, OfferDetail, OfferDetailDraft, OfferUpdate};
use crate::domain::ports::{OfferPersistenceError, OfferQuery, OfferRepository};

pub struct OfferService {
    offers: Arc<dyn OfferRepository>,
}

impl OfferService {
    pub fn new(offers: Arc<dyn OfferRepository>) -> Self {
        Self { offers }
    }

    fn map_offer_error(error: OfferPersistenceError) -> Error {
        match error {
            OfferPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("offer repository unavailable: {message}"))
            }
            OfferPersistenceError::Query { message } => {
                Error::internal(format!("offer repository error: {message}"))
            }
        }
    }

    /// Filtered, ordered, paginated catalogue listing. Open to everyone.
    pub async fn list_offers(
        &self,
        query: &OfferQuery,
        params: PageParams,
    ) -> Result<Page<Offer>, Error> {
        let (offers, count) = self
            .offers
            .list(query, params)
            .await
            .map_err(Self::map_offer_error)?;
        Ok(Page::from_counted(offers, count, params))
    }

    pub async fn get_offer(&self, id: OfferId) -> Result<Offer, Error> {
        self.offers
            .find_by_id(id)
            .await
            .map_err(Self::map_offer_error)?
            .ok_or_else(|| Error::not_found("offer not found"))
    }

    /// Single tier read, resolved by the detail's own id.
    pub async fn get_offer_detail(&self, id: OfferDetailId) -> Result<OfferDetail, Error> {
        self.offers
            .find_detail(id)
            .await
            .map_err(Self::map_offer_error)?
            .map(|(_, detail)| detail)
            .ok_or_else(|| Error::not_found("offer detail not found"))
    }

    /// Create an offer with its three tiers in one transaction. Business
    /// role required; the owner is always the caller.
    pub async fn create_offer(
        &self,
        actor: &Actor,
        title: String,
        description: String,
        image: Option<String>,
        details: Vec<OfferDetailDraft>,
    ) -> Result<Offer, Error> {
        authorization::require(actor, Action::CreateOffer)?;
        let offer = Offer::create(actor.id, title, description, image, details)
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        self.offers
            .insert(&offer)
            .await
            .map_err(Self::map_offer_error)?;
        Ok(offer)
    }

    /// Partial update; a supplied detail set replaces all three tiers
    /// atomically, an absent one leaves them untouched.
    pub async fn update_offer(
        &self,
        actor: &Actor,
        id: OfferId,
        update: OfferUpdate,
    ) -> Result<Offer, Error> {
        let mut offer = self.get_offer(id).await?;
        authorization::require(
            actor,
            Action::UpdateOffer {
                owner_id: offer.owner_id(),
            },
        )?;
        offer
            .apply_update(update)
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        self.offers
            .update(&offer)
            .await
            .map_err(Self::map_offer_error)?;
        Ok(offer)
    }

    /// Delete an offer and, by cascade, its tiers. Owner or staff.
    pub async fn delete_offer(&self, actor: &Actor, id: OfferId) -> Result<(), Error> {
        let offer = self.get_offer(id).await?;
        authorization::require(
            actor,
            Action::DeleteOffer {
                owner_id: offer.owner_id(),
            },
        )?;
        let removed = self
            .offers
            .delete(id)
            .await
            .map_err(Self::map_offer_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("offer not found"))
        }
    }
}
