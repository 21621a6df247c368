//! Port abstraction for order persistence.
use async_trait::async_trait;

use crate::domain::ids::{OrderId, UserId};
use crate::domain::order::{Order, OrderStatus};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by order repository adapters.
    pub enum OrderPersistenceError {
        Connection { message: String } => "order repository connection failed: {message}",
        Query { message: String } => "order repository query failed: {message}",
    }
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), OrderPersistenceError>;

    async fn update(&self, order: &Order) -> Result<(), OrderPersistenceError>;

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError>;

    /// Orders where the user is the customer or the business party, newest
    /// first.
    async fn list_for_participant(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Order>, OrderPersistenceError>;

    /// Delete an order outright. Returns whether a row was removed.
    async fn delete(&self, id: OrderId) -> Result<bool, OrderPersistenceError>;

    /// Count orders where the user is the business party, optionally
    /// restricted to one status.
    async fn count_for_business(
        &self,
        business_user_id: UserId,
        status: Option<OrderStatus>,
    ) -> Result<u64, OrderPersistenceError>;
}
