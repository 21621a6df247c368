//! Review API handlers.
//!
//! ```text
//! GET    /api/reviews/       list, filterable and orderable
//! POST   /api/reviews/       leave a review (one per seller)
//! GET    /api/reviews/{pk}/  read
//! PATCH  /api/reviews/{pk}/  edit (author only, masked 404)
//! DELETE /api/reviews/{pk}/  delete (author or staff)
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::ports::{ReviewOrdering, ReviewQuery};
use crate::domain::{Error, Rating, Review, ReviewId, ReviewUpdate, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ReviewResponse {
    pub id: ReviewId,
    pub business_user: UserId,
    pub reviewer: UserId,
    pub rating: Rating,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id(),
            business_user: review.business_user_id(),
            reviewer: review.reviewer_id(),
            rating: review.rating(),
            description: review.description().to_owned(),
            created_at: review.created_at(),
            updated_at: review.updated_at(),
        }
    }
}

/// Listing filters; unknown ordering keys fall back to newest-first.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct ReviewListQuery {
    pub business_user_id: Option<Uuid>,
    pub reviewer_id: Option<Uuid>,
    pub ordering: Option<String>,
}

impl ReviewListQuery {
    fn domain_query(&self) -> ReviewQuery {
        ReviewQuery {
            business_user_id: self.business_user_id.map(UserId::from_uuid),
            reviewer_id: self.reviewer_id.map(UserId::from_uuid),
            ordering: self
                .ordering
                .as_deref()
                .map_or_else(ReviewOrdering::default, ReviewOrdering::parse),
        }
    }
}

/// Review creation body. The author is always the caller.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct CreateReviewRequest {
    pub business_user: Uuid,
    pub rating: i32,
    pub description: String,
}

/// Partial review update body.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i32>,
    pub description: Option<String>,
}

fn parse_rating(raw: i32) -> Result<Rating, Error> {
    Rating::try_new(raw).map_err(|e| Error::invalid_request(e.to_string()))
}

/// List reviews.
#[utoipa::path(
    get,
    path = "/api/reviews/",
    params(ReviewListQuery),
    responses(
        (status = 200, description = "Reviews", body = [ReviewResponse]),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "listReviews"
)]
#[get("/reviews/")]
pub async fn list_reviews(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<ReviewListQuery>,
) -> ApiResult<web::Json<Vec<ReviewResponse>>> {
    let reviews = state.reviews.list_reviews(&query.domain_query()).await?;
    Ok(web::Json(reviews.into_iter().map(Into::into).collect()))
}

/// Leave a review for a business user.
#[utoipa::path(
    post,
    path = "/api/reviews/",
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = ReviewResponse),
        (status = 400, description = "Rating out of range or self-review", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown business user", body = Error),
        (status = 409, description = "Pair already reviewed", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "createReview"
)]
#[post("/reviews/")]
pub async fn create_review(
    caller: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<CreateReviewRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let review = state
        .reviews
        .create_review(
            &caller.actor,
            UserId::from_uuid(payload.business_user),
            parse_rating(payload.rating)?,
            payload.description,
        )
        .await?;
    Ok(HttpResponse::Created().json(ReviewResponse::from(review)))
}

/// Read a single review.
#[utoipa::path(
    get,
    path = "/api/reviews/{pk}/",
    responses(
        (status = 200, description = "Review", body = ReviewResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown review", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "getReview"
)]
#[get("/reviews/{pk}/")]
pub async fn get_review(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let review = state
        .reviews
        .get_review(ReviewId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(review.into()))
}

/// Edit a review. Non-authors get a 404, never a 403.
#[utoipa::path(
    patch,
    path = "/api/reviews/{pk}/",
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = ReviewResponse),
        (status = 400, description = "Rating out of range", body = Error),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown review or not the author", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "updateReview"
)]
#[patch("/reviews/{pk}/")]
pub async fn update_review(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    payload: web::Json<UpdateReviewRequest>,
) -> ApiResult<web::Json<ReviewResponse>> {
    let payload = payload.into_inner();
    let update = ReviewUpdate {
        rating: payload.rating.map(parse_rating).transpose()?,
        description: payload.description,
    };
    let review = state
        .reviews
        .update_review(&caller.actor, ReviewId::from_uuid(path.into_inner()), update)
        .await?;
    Ok(web::Json(review.into()))
}

/// Delete a review. Non-authors get a 404; staff may delete any.
#[utoipa::path(
    delete,
    path = "/api/reviews/{pk}/",
    responses(
        (status = 204, description = "Review removed"),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown review or not the author", body = Error)
    ),
    tags = ["reviews"],
    operation_id = "deleteReview"
)]
#[delete("/reviews/{pk}/")]
pub async fn delete_review(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<HttpResponse> {
    state
        .reviews
        .delete_review(&caller.actor, ReviewId::from_uuid(path.into_inner()))
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
