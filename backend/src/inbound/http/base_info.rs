//! Platform statistics handler.
//!
//! ```text
//! GET /api/base-info/  review count, average rating, seller and offer counts
//! ```

use actix_web::{get, web};

use crate::domain::PlatformStats;
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;

/// Public platform statistics.
#[utoipa::path(
    get,
    path = "/api/base-info/",
    responses(
        (status = 200, description = "Platform statistics", body = PlatformStats),
        (status = 503, description = "Store unavailable", body = crate::domain::Error)
    ),
    tags = ["base-info"],
    operation_id = "baseInfo",
    security([])
)]
#[get("/base-info/")]
pub async fn base_info(state: web::Data<HttpState>) -> ApiResult<web::Json<PlatformStats>> {
    Ok(web::Json(state.stats.stats().await?))
}
