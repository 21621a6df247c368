//! Profile API handlers.
//!
//! ```text
//! GET   /api/profile/{pk}/       read any profile (auth)
//! PATCH /api/profile/{pk}/       update own profile (or staff)
//! GET   /api/profiles/business/  active business profiles, paginated
//! GET   /api/profiles/customer/  active customer profiles, paginated
//! ```

use actix_web::{get, patch, web};
use chrono::{DateTime, Utc};
use pagination::{Page, PageParams};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::user::{Email, ProfileUpdate, UserRole};
use crate::domain::{Error, User, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Public projection of a user account and its profile fields.
///
/// Free-text fields render as empty strings rather than nulls so clients can
/// bind them to form inputs directly.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub user: UserId,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub file: Option<String>,
    pub location: String,
    pub tel: String,
    pub description: String,
    pub working_hours: String,
    #[serde(rename = "type")]
    pub role: UserRole,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        let profile = user.profile().clone();
        Self {
            user: user.id(),
            username: user.username().as_str().to_owned(),
            first_name: profile.first_name.unwrap_or_default(),
            last_name: profile.last_name.unwrap_or_default(),
            file: profile.file,
            location: profile.location.unwrap_or_default(),
            tel: profile.tel.unwrap_or_default(),
            description: profile.description.unwrap_or_default(),
            working_hours: profile.working_hours.unwrap_or_default(),
            role: user.role(),
            email: user.email().as_str().to_owned(),
            created_at: user.created_at(),
        }
    }
}

/// Partial profile update body; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ProfileUpdateRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub file: Option<String>,
    pub location: Option<String>,
    pub tel: Option<String>,
    pub description: Option<String>,
    pub working_hours: Option<String>,
    pub email: Option<String>,
}

impl TryFrom<ProfileUpdateRequest> for ProfileUpdate {
    type Error = Error;

    fn try_from(value: ProfileUpdateRequest) -> Result<Self, Self::Error> {
        let email = value
            .email
            .map(Email::new)
            .transpose()
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        Ok(Self {
            first_name: value.first_name,
            last_name: value.last_name,
            file: value.file,
            location: value.location,
            tel: value.tel,
            description: value.description,
            working_hours: value.working_hours,
            email,
        })
    }
}

/// Pagination query parameters shared by the profile list endpoints.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

impl PageQuery {
    pub fn params(&self) -> Result<PageParams, Error> {
        PageParams::new(self.page, self.page_size)
            .map_err(|e| Error::invalid_request(e.to_string()))
    }
}

/// Read a single profile by user id.
#[utoipa::path(
    get,
    path = "/api/profile/{pk}/",
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profile/{pk}/")]
pub async fn get_profile(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let user = state
        .identity
        .get_profile(UserId::from_uuid(path.into_inner()))
        .await?;
    Ok(web::Json(user.into()))
}

/// Patch profile fields; only the subject or staff may do so.
#[utoipa::path(
    patch,
    path = "/api/profile/{pk}/",
    request_body = ProfileUpdateRequest,
    responses(
        (status = 200, description = "Updated profile", body = ProfileResponse),
        (status = 401, description = "Unauthenticated", body = Error),
        (status = 403, description = "Not the profile owner", body = Error),
        (status = 404, description = "Unknown user", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "updateProfile"
)]
#[patch("/profile/{pk}/")]
pub async fn update_profile(
    caller: Authenticated,
    state: web::Data<HttpState>,
    path: web::Path<Uuid>,
    payload: web::Json<ProfileUpdateRequest>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let update = ProfileUpdate::try_from(payload.into_inner())?;
    let user = state
        .identity
        .update_profile(&caller.actor, UserId::from_uuid(path.into_inner()), update)
        .await?;
    Ok(web::Json(user.into()))
}

/// Page of active business profiles.
#[utoipa::path(
    get,
    path = "/api/profiles/business/",
    params(PageQuery),
    responses(
        (status = 200, description = "Business profiles"),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "listBusinessProfiles"
)]
#[get("/profiles/business/")]
pub async fn list_business_profiles(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<ProfileResponse>>> {
    list_profiles(&state, UserRole::Business, &query).await
}

/// Page of active customer profiles.
#[utoipa::path(
    get,
    path = "/api/profiles/customer/",
    params(PageQuery),
    responses(
        (status = 200, description = "Customer profiles"),
        (status = 401, description = "Unauthenticated", body = Error)
    ),
    tags = ["profiles"],
    operation_id = "listCustomerProfiles"
)]
#[get("/profiles/customer/")]
pub async fn list_customer_profiles(
    _caller: Authenticated,
    state: web::Data<HttpState>,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<ProfileResponse>>> {
    list_profiles(&state, UserRole::Customer, &query).await
}

async fn list_profiles(
    state: &HttpState,
    role: UserRole,
    query: &PageQuery,
) -> ApiResult<web::Json<Page<ProfileResponse>>> {
    let page = state.identity.list_profiles(role, query.params()?).await?;
    Ok(web::Json(page.map(ProfileResponse::from)))
}
