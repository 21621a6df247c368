//! Order API handlers.
//!
//! ```text
//! GET    /api/orders/                      caller's orders, both sides
//! POST   /api/orders/                      place an order (customer role)
//! GET    /api/orders/{pk}/                 participant read
//! PATCH  /api/orders/{pk}/                 status update
//! DELETE /api/orders/{pk}/                 delete (staff)
//! GET    /api/order-count/{pk}/            open orders of a business user
//! GET    /api/completed-order-count/{pk}/  completed orders of a business user
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::domain::{
    Error, OfferDetailId, OfferId, Order, OrderId, OrderStatus, OrderTarget, TierKind, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Snapshot view of an order.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct OrderResponse {
    pub id: OrderId,
    pub customer_user: UserId,
    pub business_user: UserId,
    pub title: String,
    pub revisions: i32,
    pub delivery_time_in_days: i32,
    #[schema(value_type = f64)]
    pub price: Decimal,
    pub features: Vec<String>,
    pub offer_type: TierKind,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.id(),
            customer_user: order.customer_user_id(),
            business_user: order.business_user_id(),
            title: order.title().to_owned(),
            revisions: order.revisions(),
            delivery_time_in_days: order.delivery_time_in_days(),
            price: order.price(),
            features: order.features().to_vec(),
            offer_type: order.offer_type(),
            status: order.status(),
            created_at: order.created_at(),
            updated_at: order.updated_at(),
        }
    }
}

/// Order creation body: either a tier id, or an offer id plus tier name.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateOrderRequest {
    pub offer_detail_id: Option<Uuid>,
    pub offer_id: Option<Uuid>,
    pub offer_type: Option<TierKind>,
}

impl TryFrom<CreateOrderRequest> for OrderTarget {
    type Error = Error;

    fn try_from(value: CreateOrderRequest) -> Result<Self, Self::Error> {
        if let Some(detail_id) = value.offer_detail_id {
            return Ok(Self::Detail(OfferDetailId::from_uuid(detail_id)));
        }
        match (value.offer_id, value.offer_type) {
            (Some(offer_id), Some(tier)) => Ok(Self::OfferTier {
                offer_id: OfferId::from_uuid(offer_id),
                tier,
            }),
            _ => Err(Error::invalid_request(
                "provide offer_detail_id, or offer_id together with offer_type",
            )),
        }
    }
}

/// Status patch body for `PATCH /api/orders/{pk}/`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateOrderRequest {
    pub status: String,
}

/// Optional status filter for the order-count endpoint.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct OrderCountQuery {
    pub status: Option<String>,
}

/// Orders where the caller is a party, newest first.
#[utoipa::path(
    get,
    path = "/api/orders/",
    responses(
        (status = 200, description = "Orders", body = [OrderResponse]),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["orders"],
    operation_id = "listOrders"
)]
#[get("/orders/")]
pub async fn list_orders(
    caller: Authenticated,
    state: web::Data<HttpState>,
) -> ApiResult<web::Json<Vec<OrderResponse>>> {
    let orders = state.orders.list_orders(&caller.actor).await?;
    Ok(web::Json(orders.into_iter().map(Into::into).collect()))
}

/// Place an order by snapshotting the chosen tier.
#[utoipa::path(
    post,
    path = "/api/orders/",
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order placed", body = OrderResponse),
        (status = 400, description = "No tier named", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Business accounts cannot buy", body = Error),
        (status = 404, description = "Unknown offer or tier", body = Error)
    ),
    tags = ["orders"],
    operation_id = "createOrder"
)]
#[post("/orders/")]
pub async fn create_order(
    caller: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<CreateOrderRequest>,
) -> ApiResult<HttpResponse> {
    let target = OrderTarget::try_from(payload.into_inner())?;
    let order = state.orders.create_order(&caller.actor, target).await?;
    Ok(HttpResponse::Created().json(OrderResponse::from(order)))
}

/// Read a single order.
#[utoipa::path(
    get,
    path = "/api/orders/{pk}/",
    responses(
        (status = 200, description = "Order", body = OrderResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "getOrder"
)]
#[get("/orders/{pk}/")]
pub async fn get_order(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<OrderResponse>> {
    let order = state
        .orders
        .get_order(&caller.actor, OrderId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(order.into()))
}

/// Move an order to another status.
#[utoipa::path(
    patch,
    path = "/api/orders/{pk}/",
    request_body = UpdateOrderRequest,
    responses(
        (status = 200, description = "Updated order", body = OrderResponse),
        (status = 400, description = "Unknown status value", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not a participant", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "updateOrder"
)]
#[patch("/orders/{pk}/")]
pub async fn update_order(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateOrderRequest>,
) -> ApiResult<web::Json<OrderResponse>> {
    let order = state
        .orders
        .update_status(
            &caller.actor,
            OrderId::from_uuid(path.into_inner()),
            &payload.status,
        )
        .await?;
    Ok(web::Json(order.into()))
}

/// Remove an order outright; staff only.
#[utoipa::path(
    delete,
    path = "/api/orders/{pk}/",
    responses(
        (status = 204, description = "Order removed"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Staff only", body = Error),
        (status = 404, description = "Unknown order", body = Error)
    ),
    tags = ["orders"],
    operation_id = "deleteOrder"
)]
#[delete("/orders/{pk}/")]
pub async fn delete_order(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .orders
        .delete_order(&caller.actor, OrderId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Count a business user's orders, `in_progress` unless filtered.
#[utoipa::path(
    get,
    path = "/api/order-count/{pk}/",
    params(OrderCountQuery),
    responses(
        (status = 200, description = "Order count"),
        (status = 400, description = "Unknown status value", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Not a business user", body = Error)
    ),
    tags = ["orders"],
    operation_id = "countOrders"
)]
#[get("/order-count/{pk}/")]
pub async fn count_orders(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    query: web::Query<OrderCountQuery>,
) -> ApiResult<HttpResponse> {
    let count = state
        .orders
        .count_orders(UserId::from_uuid(path.into_inner()), query.status.as_deref())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "order_count": count })))
}

/// Count a business user's completed orders.
#[utoipa::path(
    get,
    path = "/api/completed-order-count/{pk}/",
    responses(
        (status = 200, description = "Completed order count"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Not a business user", body = Error)
    ),
    tags = ["orders"],
    operation_id = "countCompletedOrders"
)]
#[get("/completed-order-count/{pk}/")]
pub async fn count_completed_orders(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    let count = state
        .orders
        .count_completed(UserId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "completed_order_count": count })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::UserRole;
    use crate::domain::{Offer, OfferDetailDraft};
    use crate::inbound::http::test_utils::TestHarness;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    macro_rules! order_app {
        ($harness:expr) => {
            actix_test::init_service(
                App::new().app_data($harness.state.clone()).service(
                    web::scope("/api")
                        .service(list_orders)
                        .service(create_order)
                        .service(get_order)
                        .service(update_order)
                        .service(delete_order)
                        .service(count_orders)
                        .service(count_completed_orders),
                ),
            )
            .await
        };
    }

    fn dec(raw: &str) -> Decimal {
        raw.parse().expect("literal decimal")
    }

    fn draft(tier: TierKind, price: &str, delivery: i32) -> OfferDetailDraft {
        OfferDetailDraft {
            title: format!("{tier} package"),
            revisions: 2,
            delivery_time_in_days: delivery,
            price: dec(price),
            features: vec!["one thing".to_owned()],
            offer_type: tier,
        }
    }

    async fn seed_offer(harness: &TestHarness, owner: UserId) -> Offer {
        let offer = Offer::create(
            owner,
            "Logo design".to_owned(),
            "Three tiers".to_owned(),
            None,
            vec![
                draft(TierKind::Basic, "100.00", 3),
                draft(TierKind::Standard, "200.00", 5),
                draft(TierKind::Premium, "300.00", 7),
            ],
        )
        .expect("valid offer");
        use crate::domain::ports::OfferRepository;
        harness.offers.insert(&offer).await.expect("seed offer");
        offer
    }

    #[actix_web::test]
    async fn ordering_a_tier_snapshots_its_fields() {
        let harness = TestHarness::new();
        let (seller, _) = harness.seed_active_user("seller", UserRole::Business).await;
        let (_, buyer_token) = harness.seed_active_user("buyer", UserRole::Customer).await;
        let offer = seed_offer(&harness, seller.id()).await;
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let app = order_app!(harness);

        let request = actix_test::TestRequest::post()
            .uri("/api/orders/")
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .set_json(serde_json::json!({ "offer_detail_id": basic.id() }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(value.get("price").and_then(Value::as_str), Some("100.00"));
        assert_eq!(
            value.get("business_user").and_then(Value::as_str),
            Some(seller.id().to_string().as_str())
        );
        assert_eq!(
            value.get("status").and_then(Value::as_str),
            Some("in_progress")
        );
    }

    #[actix_web::test]
    async fn sellers_cannot_place_orders() {
        let harness = TestHarness::new();
        let (seller, seller_token) =
            harness.seed_active_user("seller", UserRole::Business).await;
        let offer = seed_offer(&harness, seller.id()).await;
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let app = order_app!(harness);

        let request = actix_test::TestRequest::post()
            .uri("/api/orders/")
            .insert_header(("Authorization", format!("Token {seller_token}")))
            .set_json(serde_json::json!({ "offer_detail_id": basic.id() }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn naming_no_tier_is_a_validation_error() {
        let harness = TestHarness::new();
        let (_, buyer_token) = harness.seed_active_user("buyer", UserRole::Customer).await;
        let app = order_app!(harness);

        let request = actix_test::TestRequest::post()
            .uri("/api/orders/")
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .set_json(serde_json::json!({ "offer_id": uuid::Uuid::new_v4() }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn bogus_status_lists_the_accepted_set() {
        let harness = TestHarness::new();
        let (seller, _) = harness.seed_active_user("seller", UserRole::Business).await;
        let (_, buyer_token) = harness.seed_active_user("buyer", UserRole::Customer).await;
        let offer = seed_offer(&harness, seller.id()).await;
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let app = order_app!(harness);

        let create = actix_test::TestRequest::post()
            .uri("/api/orders/")
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .set_json(serde_json::json!({ "offer_detail_id": basic.id() }))
            .to_request();
        let created: Value = serde_json::from_slice(
            &actix_test::read_body(actix_test::call_service(&app, create).await).await,
        )
        .expect("payload");
        let id = created["id"].as_str().expect("order id");

        let request = actix_test::TestRequest::patch()
            .uri(&format!("/api/orders/{id}/"))
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .set_json(serde_json::json!({ "status": "bogus" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(
            value.get("details"),
            Some(&serde_json::json!({
                "accepted": ["in_progress", "completed", "cancelled"]
            }))
        );
    }

    #[actix_web::test]
    async fn delete_is_staff_only() {
        let harness = TestHarness::new();
        let (seller, _) = harness.seed_active_user("seller", UserRole::Business).await;
        let (_, buyer_token) = harness.seed_active_user("buyer", UserRole::Customer).await;
        let (_, staff_token) = harness.seed_staff_user("admin").await;
        let offer = seed_offer(&harness, seller.id()).await;
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let app = order_app!(harness);

        let create = actix_test::TestRequest::post()
            .uri("/api/orders/")
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .set_json(serde_json::json!({ "offer_detail_id": basic.id() }))
            .to_request();
        let created: Value = serde_json::from_slice(
            &actix_test::read_body(actix_test::call_service(&app, create).await).await,
        )
        .expect("payload");
        let id = created["id"].as_str().expect("order id");

        let denied = actix_test::TestRequest::delete()
            .uri(&format!("/api/orders/{id}/"))
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .to_request();
        let response = actix_test::call_service(&app, denied).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::FORBIDDEN);

        let allowed = actix_test::TestRequest::delete()
            .uri(&format!("/api/orders/{id}/"))
            .insert_header(("Authorization", format!("Token {staff_token}")))
            .to_request();
        let response = actix_test::call_service(&app, allowed).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn order_counts_default_to_in_progress() {
        let harness = TestHarness::new();
        let (seller, _) = harness.seed_active_user("seller", UserRole::Business).await;
        let (_, buyer_token) = harness.seed_active_user("buyer", UserRole::Customer).await;
        let offer = seed_offer(&harness, seller.id()).await;
        let basic = offer.detail(TierKind::Basic).expect("basic tier");
        let app = order_app!(harness);

        let create = actix_test::TestRequest::post()
            .uri("/api/orders/")
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .set_json(serde_json::json!({ "offer_detail_id": basic.id() }))
            .to_request();
        actix_test::call_service(&app, create).await;

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/order-count/{}/", seller.id()))
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(value.get("order_count").and_then(Value::as_u64), Some(1));

        let completed = actix_test::TestRequest::get()
            .uri(&format!("/api/completed-order-count/{}/", seller.id()))
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .to_request();
        let response = actix_test::call_service(&app, completed).await;
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(
            value.get("completed_order_count").and_then(Value::as_u64),
            Some(0)
        );
    }

    #[actix_web::test]
    async fn counting_orders_of_a_customer_is_not_found() {
        let harness = TestHarness::new();
        let (buyer, buyer_token) =
            harness.seed_active_user("buyer", UserRole::Customer).await;
        let app = order_app!(harness);

        let request = actix_test::TestRequest::get()
            .uri(&format!("/api/order-count/{}/", buyer.id()))
            .insert_header(("Authorization", format!("Token {buyer_token}")))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }
}
