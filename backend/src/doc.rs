//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] aggregates every HTTP endpoint and the schemas their bodies
//! reference. Debug builds serve the generated document at
//! `/api-docs/openapi.json`.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{Error, ErrorCode, PlatformStats};
use crate::inbound::http::identity::AuthSessionResponse;
use crate::inbound::http::offers::{OfferDetailResponse, OfferResponse};
use crate::inbound::http::orders::OrderResponse;
use crate::inbound::http::profiles::ProfileResponse;
use crate::inbound::http::reviews::ReviewResponse;

/// Enrich the generated document with the token header security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "TokenAuth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                "Authorization",
                "Bearer key issued at registration or login, sent as `Token <key>`.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Marketplace backend API",
        description = "Token-authenticated marketplace for tiered service offers, \
                       orders, and reviews."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("TokenAuth" = [])),
    paths(
        crate::inbound::http::identity::register,
        crate::inbound::http::identity::login,
        crate::inbound::http::identity::activate,
        crate::inbound::http::identity::request_password_reset,
        crate::inbound::http::identity::check_reset_token,
        crate::inbound::http::identity::confirm_password_reset,
        crate::inbound::http::identity::verify_token,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::update_profile,
        crate::inbound::http::profiles::list_business_profiles,
        crate::inbound::http::profiles::list_customer_profiles,
        crate::inbound::http::offers::list_offers,
        crate::inbound::http::offers::create_offer,
        crate::inbound::http::offers::get_offer,
        crate::inbound::http::offers::update_offer,
        crate::inbound::http::offers::delete_offer,
        crate::inbound::http::offers::get_offer_detail,
        crate::inbound::http::orders::list_orders,
        crate::inbound::http::orders::create_order,
        crate::inbound::http::orders::get_order,
        crate::inbound::http::orders::update_order,
        crate::inbound::http::orders::delete_order,
        crate::inbound::http::orders::count_orders,
        crate::inbound::http::orders::count_completed_orders,
        crate::inbound::http::reviews::list_reviews,
        crate::inbound::http::reviews::create_review,
        crate::inbound::http::reviews::get_review,
        crate::inbound::http::reviews::update_review,
        crate::inbound::http::reviews::delete_review,
        crate::inbound::http::base_info::base_info,
    ),
    components(schemas(
        Error,
        ErrorCode,
        AuthSessionResponse,
        ProfileResponse,
        OfferResponse,
        OfferDetailResponse,
        OrderResponse,
        ReviewResponse,
        PlatformStats,
    )),
    tags(
        (name = "identity", description = "Registration, login, and credential lifecycle"),
        (name = "profiles", description = "Account profile reads and updates"),
        (name = "offers", description = "Tiered offer catalogue"),
        (name = "orders", description = "Order snapshots and counts"),
        (name = "reviews", description = "Seller reviews"),
        (name = "base-info", description = "Public platform statistics")
    )
)]
pub struct ApiDoc;
