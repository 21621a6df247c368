//! PostgreSQL-backed `OfferRepository` implementation using Diesel.
//!
//! Offer and detail rows are always written together inside one transaction,
//! so the three-tier invariant is never observable half-applied. Catalogue
//! filters on owner and search run in SQL; the derived min-price and
//! min-delivery filters and orderings are applied after hydration, since
//! both are computed from the detail set rather than stored.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use pagination::{Page, PageParams};
use tracing::debug;
use uuid::Uuid;

use crate::domain::ids::{OfferDetailId, OfferId, UserId};
use crate::domain::offer::{Offer, OfferDetail, TierKind};
use crate::domain::ports::{
    OfferOrderKey, OfferPersistenceError, OfferQuery, OfferRepository,
};

use super::models::{NewOfferDetailRow, NewOfferRow, OfferChangeset, OfferDetailRow, OfferRow};
use super::pool::{DbPool, PoolError};
use super::schema::{offer_details, offers};

#[derive(Clone)]
pub struct DieselOfferRepository {
    pool: DbPool,
}

impl DieselOfferRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> OfferPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            OfferPersistenceError::connection(message)
        }
    }
}

fn map_diesel_error(error: diesel::result::Error) -> OfferPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(%other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            OfferPersistenceError::connection("database connection error")
        }
        _ => OfferPersistenceError::query("database error"),
    }
}

fn row_to_detail(row: OfferDetailRow) -> Result<OfferDetail, OfferPersistenceError> {
    let tier: TierKind = row
        .offer_type
        .parse()
        .map_err(|_| OfferPersistenceError::query("corrupt offer_type column"))?;
    Ok(OfferDetail::from_parts(
        OfferDetailId::from_uuid(row.id),
        row.title,
        row.revisions,
        row.delivery_time_in_days,
        row.price,
        row.features,
        tier,
    ))
}

fn assemble_offer(
    row: OfferRow,
    details: Vec<OfferDetailRow>,
) -> Result<Offer, OfferPersistenceError> {
    let details = details
        .into_iter()
        .map(row_to_detail)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Offer::from_parts(
        OfferId::from_uuid(row.id),
        UserId::from_uuid(row.owner_id),
        row.title,
        row.description,
        row.image,
        details,
        row.created_at,
        row.updated_at,
    ))
}

fn detail_rows<'a>(offer: &'a Offer) -> Vec<NewOfferDetailRow<'a>> {
    offer
        .details()
        .iter()
        .map(|detail| NewOfferDetailRow {
            id: detail.id().as_uuid(),
            offer_id: offer.id().as_uuid(),
            title: detail.title(),
            revisions: detail.revisions(),
            delivery_time_in_days: detail.delivery_time_in_days(),
            price: detail.price(),
            features: detail.features(),
            offer_type: detail.offer_type().as_str(),
        })
        .collect()
}

async fn load_details_for(
    conn: &mut AsyncPgConnection,
    offer_ids: &[Uuid],
) -> Result<HashMap<Uuid, Vec<OfferDetailRow>>, OfferPersistenceError> {
    let rows: Vec<OfferDetailRow> = offer_details::table
        .filter(offer_details::offer_id.eq_any(offer_ids))
        .select(OfferDetailRow::as_select())
        .load(conn)
        .await
        .map_err(map_diesel_error)?;
    let mut grouped: HashMap<Uuid, Vec<OfferDetailRow>> = HashMap::new();
    for row in rows {
        grouped.entry(row.offer_id).or_default().push(row);
    }
    Ok(grouped)
}

fn compare_for(key: OfferOrderKey) -> impl Fn(&Offer, &Offer) -> Ordering {
    move |a, b| match key {
        OfferOrderKey::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
        OfferOrderKey::MinPrice => a.min_price().cmp(&b.min_price()),
    }
}

#[async_trait]
impl OfferRepository for DieselOfferRepository {
    async fn insert(&self, offer: &Offer) -> Result<(), OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let offer_row = NewOfferRow {
            id: offer.id().as_uuid(),
            owner_id: offer.owner_id().as_uuid(),
            title: offer.title(),
            description: offer.description(),
            image: offer.image(),
            created_at: offer.created_at(),
            updated_at: offer.updated_at(),
        };
        let details = detail_rows(offer);
        conn.transaction(|conn| {
            async move {
                diesel::insert_into(offers::table)
                    .values(&offer_row)
                    .execute(conn)
                    .await?;
                diesel::insert_into(offer_details::table)
                    .values(&details)
                    .execute(conn)
                    .await?;
                Ok::<(), diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn update(&self, offer: &Offer) -> Result<(), OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = OfferChangeset {
            title: offer.title(),
            description: offer.description(),
            image: offer.image(),
            updated_at: offer.updated_at(),
        };
        let details = detail_rows(offer);
        let offer_id = offer.id().as_uuid();
        // Delete-then-recreate keeps replaced tiers invisible mid-flight.
        conn.transaction(|conn| {
            async move {
                diesel::update(offers::table.find(offer_id))
                    .set(&changes)
                    .execute(conn)
                    .await?;
                diesel::delete(
                    offer_details::table.filter(offer_details::offer_id.eq(offer_id)),
                )
                .execute(conn)
                .await?;
                diesel::insert_into(offer_details::table)
                    .values(&details)
                    .execute(conn)
                    .await?;
                Ok::<(), diesel::result::Error>(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_diesel_error)
    }

    async fn find_by_id(&self, id: OfferId) -> Result<Option<Offer>, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(row) = offers::table
            .find(id.as_uuid())
            .select(OfferRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        let mut grouped = load_details_for(&mut conn, &[row.id]).await?;
        let details = grouped.remove(&row.id).unwrap_or_default();
        assemble_offer(row, details).map(Some)
    }

    async fn find_detail(
        &self,
        id: OfferDetailId,
    ) -> Result<Option<(Offer, OfferDetail)>, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let Some(owning_offer_id) = offer_details::table
            .find(id.as_uuid())
            .select(offer_details::offer_id)
            .first::<Uuid>(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?
        else {
            return Ok(None);
        };
        drop(conn);

        let Some(offer) = self
            .find_by_id(OfferId::from_uuid(owning_offer_id))
            .await?
        else {
            return Ok(None);
        };
        let detail = offer
            .details()
            .iter()
            .find(|d| d.id() == id)
            .cloned()
            .ok_or_else(|| OfferPersistenceError::query("detail vanished during lookup"))?;
        Ok(Some((offer, detail)))
    }

    async fn delete(&self, id: OfferId) -> Result<bool, OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        // offer_details rows go with it via ON DELETE CASCADE.
        let removed = diesel::delete(offers::table.find(id.as_uuid()))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }

    async fn list(
        &self,
        query: &OfferQuery,
        params: PageParams,
    ) -> Result<(Vec<Offer>, u64), OfferPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let mut sql = offers::table.into_boxed();
        if let Some(owner_id) = query.owner_id {
            sql = sql.filter(offers::owner_id.eq(owner_id.as_uuid()));
        }
        if let Some(search) = query.search.as_deref().filter(|s| !s.is_empty()) {
            let needle = format!("%{}%", search.replace('%', "\\%").replace('_', "\\_"));
            sql = sql.filter(
                offers::title
                    .ilike(needle.clone())
                    .or(offers::description.ilike(needle)),
            );
        }
        let rows: Vec<OfferRow> = sql
            .select(OfferRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut grouped = load_details_for(&mut conn, &ids).await?;

        let mut matching = rows
            .into_iter()
            .map(|row| {
                let details = grouped.remove(&row.id).unwrap_or_default();
                assemble_offer(row, details)
            })
            .collect::<Result<Vec<_>, _>>()?;

        // Derived-value filters run over the hydrated aggregates.
        if let Some(min_price) = query.min_price {
            matching.retain(|offer| offer.min_price() >= min_price);
        }
        if let Some(max_delivery) = query.max_delivery_time {
            matching.retain(|offer| offer.min_delivery_time() <= max_delivery);
        }

        let compare = compare_for(query.ordering.key);
        matching.sort_by(|a, b| {
            let ordering = compare(a, b);
            if query.ordering.descending {
                ordering.reverse()
            } else {
                ordering
            }
        });

        let page = Page::from_full_results(matching, params);
        Ok((page.results, page.count))
    }
}
