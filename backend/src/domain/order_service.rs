//! Order ledger operations: snapshot creation, participant-scoped reads,
//! status updates, and per-business counts.

use std::sync::Arc;

use serde_json::json;

use crate::domain::auth::Actor;
use crate::domain::authorization::{self, Action};
use crate::domain::error::Error;
use crate::domain::ids::{OfferDetailId, OfferId, OrderId, UserId};
use crate::domain::offer::TierKind;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::{
    OfferPersistenceError, OfferRepository, OrderPersistenceError, OrderRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::user::UserRole;

/// How the buyer names the tier they are purchasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderTarget {
    Detail(OfferDetailId),
    OfferTier { offer_id: OfferId, tier: TierKind },
}

pub struct OrderService {
    orders: Arc<dyn OrderRepository>,
    offers: Arc<dyn OfferRepository>,
    users: Arc<dyn UserRepository>,
}

impl OrderService {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        offers: Arc<dyn OfferRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            orders,
            offers,
            users,
        }
    }

    fn map_order_error(error: OrderPersistenceError) -> Error {
        match error {
            OrderPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("order repository unavailable: {message}"))
            }
            OrderPersistenceError::Query { message } => {
                Error::internal(format!("order repository error: {message}"))
            }
        }
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

    fn map_user_error(error: UserPersistenceError) -> Error {
        match error {
            UserPersistenceError::Connection { message } => {
                Error::service_unavailable(format!("user repository unavailable: {message}"))
            }
            other => Error::internal(format!("user repository error: {other}")),
        }
    }

    fn invalid_status(raw: &str) -> Error {
        Error::invalid_request(format!("'{raw}' is not a recognised order status"))
            .with_details(json!({ "accepted": OrderStatus::ALL }))
    }

    /// Parse a caller-supplied status string against the closed value set.
    pub fn parse_status(raw: &str) -> Result<OrderStatus, Error> {
        raw.parse().map_err(|_| Self::invalid_status(raw))
    }

    /// Snapshot the chosen tier into a new order. Customer role required;
    /// the business party comes from the offer's owner, never the caller.
    pub async fn create_order(&self, actor: &Actor, target: OrderTarget) -> Result<Order, Error> {
        authorization::require(actor, Action::CreateOrder)?;

        // Single fetch: the snapshot is taken from this one read, so a
        // concurrent edit to the tier cannot tear the copy.
        let (offer, detail) = match target {
            OrderTarget::Detail(detail_id) => self
                .offers
                .find_detail(detail_id)
                .await
                .map_err(Self::map_offer_error)?
                .ok_or_else(|| Error::not_found("offer detail not found"))?,
            OrderTarget::OfferTier { offer_id, tier } => {
                let offer = self
                    .offers
                    .find_by_id(offer_id)
                    .await
                    .map_err(Self::map_offer_error)?
                    .ok_or_else(|| Error::not_found("offer not found"))?;
                let detail = offer
                    .detail(tier)
                    .cloned()
                    .ok_or_else(|| Error::not_found("offer detail not found"))?;
                (offer, detail)
            }
        };

        let order = Order::from_detail(actor.id, &offer, &detail);
        self.orders
            .insert(&order)
            .await
            .map_err(Self::map_order_error)?;
        Ok(order)
    }

    /// Fetch a single order; only its participants and staff may read it.
    pub async fn get_order(&self, actor: &Actor, id: OrderId) -> Result<Order, Error> {
        let order = self
            .orders
            .find_by_id(id)
            .await
            .map_err(Self::map_order_error)?
            .ok_or_else(|| Error::not_found("order not found"))?;
        authorization::require(
            actor,
            Action::ReadOrder {
                customer_id: order.customer_user_id(),
                business_id: order.business_user_id(),
            },
        )?;
        Ok(order)
    }

    /// Orders where the caller is a party, newest first.
    pub async fn list_orders(&self, actor: &Actor) -> Result<Vec<Order>, Error> {
        self.orders
            .list_for_participant(actor.id)
            .await
            .map_err(Self::map_order_error)
    }

    /// Move an order to one of the recognised status values.
    pub async fn update_status(
        &self,
        actor: &Actor,
        id: OrderId,
        raw_status: &str,
    ) -> Result<Order, Error> {
        let status = Self::parse_status(raw_status)?;
        let mut order = self
            .orders
            .find_by_id(id)
            .await
            .map_err(Self::map_order_error)?
            .ok_or_else(|| Error::not_found("order not found"))?;
        authorization::require(
            actor,
            Action::UpdateOrder {
                customer_id: order.customer_user_id(),
                business_id: order.business_user_id(),
            },
        )?;
        order.set_status(status);
        self.orders
            .update(&order)
            .await
            .map_err(Self::map_order_error)?;
        Ok(order)
    }

    /// Remove an order outright; staff only.
    pub async fn delete_order(&self, actor: &Actor, id: OrderId) -> Result<(), Error> {
        authorization::require(actor, Action::DeleteOrder)?;
        let removed = self
            .orders
            .delete(id)
            .await
            .map_err(Self::map_order_error)?;
        if removed {
            Ok(())
        } else {
            Err(Error::not_found("order not found"))
        }
    }

    async fn require_business_user(&self, business_user_id: UserId) -> Result<(), Error> {
        let user = self
            .users
            .find_by_id(business_user_id)
            .await
            .map_err(Self::map_user_error)?;
        match user {
            Some(user) if user.role() == UserRole::Business => Ok(()),
            _ => Err(Error::not_found("business user not found")),
        }
    }

    /// Count a business user's orders, restricted to one status when a
    /// filter is supplied (`in_progress` when not).
    pub async fn count_orders(
        &self,
        business_user_id: UserId,
        status_filter: Option<&str>,
    ) -> Result<u64, Error> {
        let status = match status_filter {
            Some(raw) => Self::parse_status(raw)?,
            None => OrderStatus::InProgress,
        };
        self.require_business_user(business_user_id).await?;
        self.orders
            .count_for_business(business_user_id, Some(status))
            .await
            .map_err(Self::map_order_error)
    }

    pub async fn count_completed(&self, business_user_id: UserId) -> Result<u64, Error> {
        self.require_business_user(business_user_id).await?;
        self.orders
            .count_for_business(business_user_id, Some(OrderStatus::Completed))
            .await
            .map_err(Self::map_order_error)
    }
}
