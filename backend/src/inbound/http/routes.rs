//! Route registration for the `/api` scope.

use actix_web::web;

use crate::inbound::http::{base_info, identity, offers, orders, profiles, reviews};

/// Mount every handler under `/api`, Django-parity paths with trailing
/// slashes.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .service(identity::register)
            .service(identity::login)
            .service(identity::activate)
            .service(identity::request_password_reset)
            .service(identity::check_reset_token)
            .service(identity::confirm_password_reset)
            .service(identity::verify_token)
            .service(profiles::get_profile)
            .service(profiles::update_profile)
            .service(profiles::list_business_profiles)
            .service(profiles::list_customer_profiles)
            .service(offers::list_offers)
            .service(offers::create_offer)
            .service(offers::get_offer)
            .service(offers::update_offer)
            .service(offers::delete_offer)
            .service(offers::get_offer_detail)
            .service(orders::list_orders)
            .service(orders::create_order)
            .service(orders::get_order)
            .service(orders::update_order)
            .service(orders::delete_order)
            .service(orders::count_orders)
            .service(orders::count_completed_orders)
            .service(reviews::list_reviews)
            .service(reviews::create_review)
            .service(reviews::get_review)
            .service(reviews::update_review)
            .service(reviews::delete_review)
            .service(base_info::base_info),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::TestHarness;
    use actix_web::{App, test as actix_test};

    #[actix_web::test]
    async fn the_full_scope_mounts_without_conflicts() {
        let harness = TestHarness::new();
        let app = actix_test::init_service(
            App::new()
                .app_data(harness.state.clone())
                .configure(configure),
        )
        .await;

        let request = actix_test::TestRequest::get()
            .uri("/api/base-info/")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert!(response.status().is_success());

        let request = actix_test::TestRequest::get()
            .uri("/api/offers/")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert!(response.status().is_success());
    }
}
