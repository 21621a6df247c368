//! PostgreSQL-backed `OrderRepository` implementation using Diesel.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ids::{OrderId, UserId};
use crate::domain::offer::TierKind;
use crate::domain::order::{Order, OrderStatus};
use crate::domain::ports::{OrderPersistenceError, OrderRepository};

use super::models::{NewOrderRow, OrderRow};
use super::pool::{DbPool, PoolError};
use super::schema::orders;

#[derive(Clone)]
pub struct DieselOrderRepository {
    pool: DbPool,
}

impl DieselOrderRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OrderPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            OrderPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> OrderPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            OrderPersistenceError::connection("database connection error")
        }
        _ => OrderPersistenceError::query("database error"),
    }
}

fn row_to_order(row: OrderRow) -> Result<Order, OrderPersistenceError> {
    let offer_type: TierKind = row
        .offer_type
        .parse()
        .map_err(|_| OrderPersistenceError::query("corrupt offer_type column"))?;
    let status: OrderStatus = row
        .status
        .parse()
        .map_err(|_| OrderPersistenceError::query("corrupt status column"))?;
    Ok(Order::from_parts(
        OrderId::from_uuid(row.id),
        UserId::from_uuid(row.customer_user_id),
        UserId::from_uuid(row.business_user_id),
        row.title,
        row.revisions,
        row.delivery_time_in_days,
        row.price,
        row.features,
        offer_type,
        status,
        row.created_at,
        row.updated_at,
    ))
}

#[async_trait]
impl OrderRepository for DieselOrderRepository {
    async fn insert(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewOrderRow {
            id: order.id().as_uuid(),
            customer_user_id: order.customer_user_id().as_uuid(),
            business_user_id: order.business_user_id().as_uuid(),
            title: order.title(),
            revisions: order.revisions(),
            delivery_time_in_days: order.delivery_time_in_days(),
            price: order.price(),
            features: order.features(),
            offer_type: order.offer_type().as_str(),
            status: order.status().as_str(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        };
        diesel::insert_into(orders::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // Snapshot fields are immutable; only the status moves.
        diesel::update(orders::table.find(order.id().as_uuid()))
            .set((
                orders::status.eq(order.status().as_str()),
                orders::updated_at.eq(order.updated_at()),
            ))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = orders::table
            .find(id.as_uuid())
            .select(OrderRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        row.map(row_to_order).transpose()
    }

    async fn list_for_participant(
        &self,
        user_id: UserId,
    ) -> Result<Vec<Order>, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<OrderRow> = orders::table
            .filter(
                orders::customer_user_id
                    .eq(user_id.as_uuid())
                    .or(orders::business_user_id.eq(user_id.as_uuid())),
            )
            .order(orders::created_at.desc())
            .select(OrderRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.into_iter().map(row_to_order).collect()
    }

    async fn delete(&self, id: OrderId) -> Result<bool, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = diesel::delete(orders::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn count_for_business(
        &self,
        business_user_id: UserId,
        status: Option<OrderStatus>,
    ) -> Result<u64, OrderPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut sql = orders::table
            .filter(orders::business_user_id.eq(business_user_id.as_uuid()))
            .into_boxed();
        if let Some(status) = status {
            sql = sql.filter(orders::status.eq(status.as_str()));
        }
        let count: i64 = sql
            .count()
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        #[expect(clippy::cast_sign_loss, reason = "COUNT(*) is never negative")]
        Ok(count as u64)
    }
}
