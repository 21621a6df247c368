//! Offer catalogue API handlers.
//!
//! ```text
//! GET    /api/offers/             filtered, ordered, paginated listing
//! POST   /api/offers/             create a three-tier offer (business role)
//! GET    /api/offers/{pk}/        offer with tiers and derived minima
//! PATCH  /api/offers/{pk}/        partial update (owner)
//! DELETE /api/offers/{pk}/        delete (owner or staff)
//! GET    /api/offerdetails/{pk}/  single pricing tier
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use pagination::Page;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::ports::{OfferOrdering, OfferQuery};
use crate::domain::{
    Error, Offer, OfferDetail, OfferDetailDraft, OfferDetailId, OfferId, OfferUpdate, TierKind,
    UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::profiles::PageQuery;
use crate::inbound::http::state::HttpState;

/// One pricing tier in an offer response.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OfferDetailResponse {
    pub id: OfferDetailId,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[schema(value_type = f64, example = 99.5)]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: TierKind,
}

impl From<&OfferDetail> for OfferDetailResponse {
    fn from(detail: &OfferDetail) -> Self {
        Self {
            id: detail.id(),
            title: detail.title().to_owned(),
            revisions: detail.revisions(),
            delivery_time_in_days: detail.delivery_time_in_days(),
            price: detail.price(),
            features: detail.features().to_vec(),
            offer_type: detail.offer_type(),
        }
    }
}

/// Offer with its tiers and the derived minima recomputed on every read.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OfferResponse {
    pub id: OfferId,
    pub user: UserId,
    pub title: String,
    pub image: Option<String>,
    pub description: String,
    pub details: Vec<OfferDetailResponse>,
    #[schema(value_type = f64)]
    pub min_price: Decimal,
    pub min_delivery_time: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Offer> for OfferResponse {
    fn from(offer: Offer) -> Self {
        Self {
            id: offer.id(),
            user: offer.owner_id(),
            title: offer.title().to_owned(),
            image: offer.image().map(str::to_owned),
            description: offer.description().to_owned(),
            details: offer.details().iter().map(Into::into).collect(),
            min_price: offer.min_price(),
            min_delivery_time: offer.min_delivery_time(),
            created_at: offer.created_at(),
            updated_at: offer.updated_at(),
        }
    }
}

/// Listing filters; unknown ordering keys fall back to newest-first.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct OfferListQuery {
    pub creator_id: Option<Uuid>,
    pub search: Option<String>,
    #[param(value_type = Option<f64>)]
    pub min_price: Option<Decimal>,
    pub max_delivery_time: Option<i32>,
    pub ordering: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl OfferListQuery {
    fn domain_query(&self) -> OfferQuery {
        OfferQuery {
            owner_id: self.creator_id.map(UserId::from_uuid),
            search: self.search.clone(),
            min_price: self.min_price,
            max_delivery_time: self.max_delivery_time,
            ordering: self
                .ordering
                .as_deref()
                .map_or_else(OfferOrdering::default, OfferOrdering::parse),
        }
    }
}

/// Offer creation body; the tier set must be exactly basic, standard, and
/// premium.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateOfferRequest {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub details: Vec<OfferDetailDraft>,
}

/// Distinguishes an absent field from an explicit null.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Partial offer update; `"image": null` clears the image while leaving it
/// out keeps the current one.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateOfferRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub image: Option<Option<String>>,
    pub details: Option<Vec<OfferDetailDraft>>,
}

impl From<UpdateOfferRequest> for OfferUpdate {
    fn from(value: UpdateOfferRequest) -> Self {
        Self {
            title: value.title,
            description: value.description,
            image: value.image,
            details: value.details,
        }
    }
}

/// Browse the catalogue.
#[utoipa::path(
    get,
    path = "/api/offers/",
    params(OfferListQuery),
    responses(
        (status = 200, description = "Page of offers"),
        (status = 400, description = "Invalid filter or page", body = Error)
    ),
    tags = ["offers"],
    operation_id = "listOffers",
    security([])
)]
#[get("/offers/")]
pub async fn list_offers(
    state: web::Data<HttpState>,
    query: web::Query<OfferListQuery>,
) -> ApiResult<web::Json<Page<OfferResponse>>> {
    let params = PageQuery {
        page: query.page,
        page_size: query.page_size,
    }
    .params()?;
    let page = state
        .offers
        .list_offers(&query.domain_query(), params)
        .await?;
    Ok(web::Json(page.map(OfferResponse::from)))
}

/// Create an offer owned by the caller.
#[utoipa::path(
    post,
    path = "/api/offers/",
    request_body = CreateOfferRequest,
    responses(
        (status = 201, description = "Offer created", body = OfferResponse),
        (status = 400, description = "Invalid tier set", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Customer accounts cannot sell", body = Error)
    ),
    tags = ["offers"],
    operation_id = "createOffer"
)]
#[post("/offers/")]
pub async fn create_offer(
    caller: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<CreateOfferRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let offer = state
        .offers
        .create_offer(
            &caller.actor,
            payload.title,
            payload.description,
            payload.image,
            payload.details,
        )
        .await?;
    Ok(HttpResponse::Created().json(OfferResponse::from(offer)))
}

/// Read one offer with its tiers.
#[utoipa::path(
    get,
    path = "/api/offers/{pk}/",
    responses(
        (status = 200, description = "Offer", body = OfferResponse),
        (status = 404, description = "Unknown offer", body = Error)
    ),
    tags = ["offers"],
    operation_id = "getOffer",
    security([])
)]
#[get("/offers/{pk}/")]
pub async fn get_offer(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OfferResponse>> {
    let offer = state
        .offers
        .get_offer(OfferId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(offer.into()))
}

/// Patch an offer; a supplied detail set replaces all three tiers.
#[utoipa::path(
    patch,
    path = "/api/offers/{pk}/",
    request_body = UpdateOfferRequest,
    responses(
        (status = 200, description = "Updated offer", body = OfferResponse),
        (status = 400, description = "Invalid tier set", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown offer", body = Error)
    ),
    tags = ["offers"],
    operation_id = "updateOffer"
)]
#[patch("/offers/{pk}/")]
pub async fn update_offer(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateOfferRequest>,
) -> ApiResult<web::Json<OfferResponse>> {
    let offer = state
        .offers
        .update_offer(
            &caller.actor,
            OfferId::from_uuid(path.into_inner()),
            payload.into_inner().into(),
        )
        .await?;
    Ok(web::Json(offer.into()))
}

/// Delete an offer and its tiers.
#[utoipa::path(
    delete,
    path = "/api/offers/{pk}/",
    responses(
        (status = 204, description = "Offer removed"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the owner", body = Error),
        (status = 404, description = "Unknown offer", body = Error)
    ),
    tags = ["offers"],
    operation_id = "deleteOffer"
)]
#[delete("/offers/{pk}/")]
pub async fn delete_offer(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .offers
        .delete_offer(&caller.actor, OfferId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Read a single pricing tier by its own id.
#[utoipa::path(
    get,
    path = "/api/offerdetails/{pk}/",
    responses(
        (status = 200, description = "Tier", body = OfferDetailResponse),
        (status = 404, description = "Unknown tier", body = Error)
    ),
    tags = ["offers"],
    operation_id = "getOfferDetail",
    security([])
)]
#[get("/offerdetails/{pk}/")]
pub async fn get_offer_detail(
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OfferDetailResponse>> {
    let detail = state
        .offers
        .get_offer_detail(OfferDetailId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(OfferDetailResponse::from(&detail)))
}
