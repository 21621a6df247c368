//! Server construction: adapter wiring and the Actix run loop.

mod config;

pub use config::{ConfigError, ServerConfig};

use std::sync::Arc;

use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
#[cfg(debug_assertions)]
use utoipa::OpenApi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::domain::ports::{
    Mailer, OfferRepository, OrderRepository, PasswordResetRepository, ReviewRepository,
    StatsRepository, UserRepository,
};
use crate::domain::{
    IdentityService, OfferService, OrderService, ReviewService, StatsService, TokenSigner,
};
use crate::inbound::http::routes;
use crate::inbound::http::state::HttpState;
use crate::outbound::mailer::TracingMailer;
#[cfg(feature = "smtp")]
use crate::outbound::mailer::SmtpMailer;
use crate::outbound::persistence::{
    DbPool, DieselOfferRepository, DieselOrderRepository, DieselPasswordResetRepository,
    DieselReviewRepository, DieselStatsRepository, DieselUserRepository,
};

fn build_mailer(config: &ServerConfig) -> std::io::Result<Arc<dyn Mailer>> {
    #[cfg(feature = "smtp")]
    if let Some(smtp) = &config.smtp {
        let mailer = SmtpMailer::new(smtp)
            .map_err(|e| std::io::Error::other(format!("smtp setup failed: {e}")))?;
        return Ok(Arc::new(mailer));
    }
    #[cfg(not(feature = "smtp"))]
    let _ = config;
    Ok(Arc::new(TracingMailer))
}

/// Wire the Diesel adapters and domain services into the shared HTTP state.
pub fn build_http_state(
    pool: DbPool,
    config: &ServerConfig,
) -> std::io::Result<web::Data<HttpState>> {
    let users: Arc<dyn UserRepository> = Arc::new(DieselUserRepository::new(pool.clone()));
    let resets: Arc<dyn PasswordResetRepository> =
        Arc::new(DieselPasswordResetRepository::new(pool.clone()));
    let offers: Arc<dyn OfferRepository> = Arc::new(DieselOfferRepository::new(pool.clone()));
    let orders: Arc<dyn OrderRepository> = Arc::new(DieselOrderRepository::new(pool.clone()));
    let reviews: Arc<dyn ReviewRepository> = Arc::new(DieselReviewRepository::new(pool.clone()));
    let stats: Arc<dyn StatsRepository> = Arc::new(DieselStatsRepository::new(pool));

    let identity = Arc::new(IdentityService::new(
        Arc::clone(&users),
        resets,
        build_mailer(config)?,
        TokenSigner::new(config.secret_key.clone().into_bytes()),
        config.public_base_url.clone(),
    ));
    let state = HttpState {
        identity,
        offers: Arc::new(OfferService::new(Arc::clone(&offers))),
        orders: Arc::new(OrderService::new(
            orders,
            offers,
            Arc::clone(&users),
        )),
        reviews: Arc::new(ReviewService::new(reviews, users)),
        stats: Arc::new(StatsService::new(stats)),
    };
    Ok(web::Data::new(state))
}

#[cfg(debug_assertions)]
async fn openapi_json() -> web::Json<utoipa::openapi::OpenApi> {
    web::Json(ApiDoc::openapi())
}

/// Bind and start the HTTP server.
pub fn run(config: &ServerConfig, state: web::Data<HttpState>) -> std::io::Result<Server> {
    let server = HttpServer::new(move || {
        let app = App::new().app_data(state.clone()).configure(routes::configure);
        #[cfg(debug_assertions)]
        let app = app.route("/api-docs/openapi.json", web::get().to(openapi_json));
        app
    })
    .bind(config.bind_addr)?;
    Ok(server.run())
}
