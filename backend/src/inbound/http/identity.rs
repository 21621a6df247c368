//! Account lifecycle API handlers.
//!
//! ```text
//! POST /api/registration/               register a new account
//! POST /api/login/                      exchange credentials for a token
//! GET  /api/activate/{uidb64}/{token}/  follow an activation link
//! POST /api/password-reset/             request a reset mail
//! POST /api/password-reset/check/       probe a reset token
//! POST /api/password-reset/confirm/     set a new password
//! POST /api/verify-token/               confirm a cached token
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    ActivationOutcome, AuthSession, Credentials, Error, RegisterRequest, ResetTokenStatus, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::Authenticated;
use crate::inbound::http::state::HttpState;

/// Registration request body for `POST /api/registration/`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub repeated_password: String,
    /// `customer` or `business`; fixed for the lifetime of the account.
    pub role: String,
}

/// Token response returned by registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AuthSessionResponse {
    pub token: String,
    pub username: String,
    pub email: String,
    pub user_id: UserId,
}

impl From<AuthSession> for AuthSessionResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            username: session.username,
            email: session.email,
            user_id: session.user_id,
        }
    }
}

/// Login request body for `POST /api/login/`.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Register a new, inactive account and return its bearer token.
#[utoipa::path(
    post,
    path = "/api/registration/",
    request_body = RegistrationRequest,
    responses(
        (status = 201, description = "Account created", body = AuthSessionResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 503, description = "Store unavailable", body = Error)
    ),
    tags = ["identity"],
    operation_id = "register",
    security([])
)]
#[post("/registration/")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegistrationRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let session = state
        .identity
        .register(RegisterRequest {
            username: payload.username,
            email: payload.email,
            password: payload.password,
            repeated_password: payload.repeated_password,
            role: payload.role,
        })
        .await?;
    Ok(HttpResponse::Created().json(AuthSessionResponse::from(session)))
}

/// Exchange credentials for the account's bearer token.
#[utoipa::path(
    post,
    path = "/api/login/",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AuthSessionResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error)
    ),
    tags = ["identity"],
    operation_id = "login",
    security([])
)]
#[post("/login/")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials = Credentials::try_from_parts(&payload.username, &payload.password)
        .map_err(|e| Error::invalid_request(e.to_string()))?;
    let session = state.identity.login(credentials).await?;
    Ok(HttpResponse::Ok().json(AuthSessionResponse::from(session)))
}

/// Follow an activation link from the registration mail.
#[utoipa::path(
    get,
    path = "/api/activate/{uidb64}/{token}/",
    responses(
        (status = 200, description = "Account activated"),
        (status = 400, description = "Invalid or expired link", body = Error)
    ),
    tags = ["identity"],
    operation_id = "activate",
    security([])
)]
#[get("/activate/{uidb64}/{token}/")]
pub async fn activate(
    state: web::Data<HttpState>,
    path: web::Path<(String, String)>,
) -> ApiResult<HttpResponse> {
    let (uidb64, activation_token) = path.into_inner();
    match state.identity.activate(&uidb64, &activation_token).await? {
        ActivationOutcome::Activated => {
            Ok(HttpResponse::Ok().json(json!({ "message": "Account successfully activated." })))
        }
        ActivationOutcome::AlreadyActive => {
            Ok(HttpResponse::Ok().json(json!({ "message": "Account is already activated." })))
        }
        ActivationOutcome::InvalidLink => {
            Err(Error::invalid_request("activation link is invalid or has expired"))
        }
    }
}

/// Reset request body carrying the account's email address.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PasswordResetRequest {
    pub email: String,
}

/// Request a password-reset mail.
#[utoipa::path(
    post,
    path = "/api/password-reset/",
    request_body = PasswordResetRequest,
    responses(
        (status = 200, description = "Reset mail queued"),
        (status = 404, description = "Unknown email address", body = Error)
    ),
    tags = ["identity"],
    operation_id = "requestPasswordReset",
    security([])
)]
#[post("/password-reset/")]
pub async fn request_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetRequest>,
) -> ApiResult<HttpResponse> {
    state.identity.request_password_reset(&payload.email).await?;
    Ok(HttpResponse::Ok()
        .json(json!({ "detail": "An email has been sent to reset your password." })))
}

/// Token-probe request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ResetTokenProbe {
    pub token: String,
}

fn status_label(status: ResetTokenStatus) -> &'static str {
    match status {
        ResetTokenStatus::Valid => "valid",
        ResetTokenStatus::Invalid => "invalid",
        ResetTokenStatus::Expired => "expired",
    }
}

/// Check whether a reset token is still usable.
#[utoipa::path(
    post,
    path = "/api/password-reset/check/",
    request_body = ResetTokenProbe,
    responses((status = 200, description = "Token status")),
    tags = ["identity"],
    operation_id = "checkResetToken",
    security([])
)]
#[post("/password-reset/check/")]
pub async fn check_reset_token(
    state: web::Data<HttpState>,
    payload: web::Json<ResetTokenProbe>,
) -> ApiResult<HttpResponse> {
    let status = state.identity.check_reset_token(&payload.token).await?;
    Ok(HttpResponse::Ok().json(json!({ "status": status_label(status) })))
}

/// Reset confirmation body: the mailed token plus the new password.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct PasswordResetConfirm {
    pub token: String,
    pub new_password: String,
}

/// Set a new password using a mailed reset token.
#[utoipa::path(
    post,
    path = "/api/password-reset/confirm/",
    request_body = PasswordResetConfirm,
    responses(
        (status = 200, description = "Password replaced"),
        (status = 400, description = "Invalid or expired token", body = Error),
        (status = 404, description = "Account no longer exists", body = Error)
    ),
    tags = ["identity"],
    operation_id = "confirmPasswordReset",
    security([])
)]
#[post("/password-reset/confirm/")]
pub async fn confirm_password_reset(
    state: web::Data<HttpState>,
    payload: web::Json<PasswordResetConfirm>,
) -> ApiResult<HttpResponse> {
    state
        .identity
        .consume_reset_token(&payload.token, &payload.new_password)
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "detail": "Your password has been reset." })))
}

/// Verify-token request body.
#[derive(Debug, Clone, Deserialize, Serialize, utoipa::ToSchema)]
pub struct VerifyTokenRequest {
    pub token: String,
}

/// Confirm that the caller's cached token matches server state.
#[utoipa::path(
    post,
    path = "/api/verify-token/",
    request_body = VerifyTokenRequest,
    responses(
        (status = 200, description = "Token matches"),
        (status = 401, description = "Token does not match", body = Error)
    ),
    tags = ["identity"],
    operation_id = "verifyToken"
)]
#[post("/verify-token/")]
pub async fn verify_token(
    caller: Authenticated,
    state: web::Data<HttpState>,
    payload: web::Json<VerifyTokenRequest>,
) -> ApiResult<HttpResponse> {
    if state
        .identity
        .verify_token(&caller.actor, &payload.token)
        .await?
    {
        Ok(HttpResponse::Ok().json(json!({ "valid": true })))
    } else {
        Err(Error::unauthorized("token does not match"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::TestHarness;
    use actix_web::{App, test as actix_test};
    use serde_json::Value;

    fn registration_body(username: &str, role: &str) -> Value {
        json!({
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "correct horse",
            "repeated_password": "correct horse",
            "role": role,
        })
    }

    macro_rules! identity_app {
        ($harness:expr) => {
            actix_test::init_service(
                App::new().app_data($harness.state.clone()).service(
                    web::scope("/api")
                        .service(register)
                        .service(login)
                        .service(activate)
                        .service(request_password_reset)
                        .service(check_reset_token)
                        .service(confirm_password_reset)
                        .service(verify_token),
                ),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn registration_returns_token_and_identity() {
        let harness = TestHarness::new();
        let app = identity_app!(harness);

        let request = actix_test::TestRequest::post()
            .uri("/api/registration/")
            .set_json(registration_body("gustav", "customer"))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::CREATED);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(value.get("username").and_then(Value::as_str), Some("gustav"));
        assert_eq!(
            value.get("token").and_then(Value::as_str).map(str::len),
            Some(40)
        );
    }

    #[actix_web::test]
    async fn registration_rejects_mismatched_passwords() {
        let harness = TestHarness::new();
        let app = identity_app!(harness);

        let mut body = registration_body("gustav", "customer");
        body["repeated_password"] = json!("something else");
        let request = actix_test::TestRequest::post()
            .uri("/api/registration/")
            .set_json(body)
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(
            value.get("code").and_then(Value::as_str),
            Some("invalid_request")
        );
        assert_eq!(
            value.get("message").and_then(Value::as_str),
            Some("passwords do not match")
        );
    }

    #[actix_web::test]
    async fn login_round_trips_a_registered_account() {
        let harness = TestHarness::new();
        let app = identity_app!(harness);

        let register_req = actix_test::TestRequest::post()
            .uri("/api/registration/")
            .set_json(registration_body("freya", "business"))
            .to_request();
        let register_res = actix_test::call_service(&app, register_req).await;
        assert!(register_res.status().is_success());
        let registered: Value =
            serde_json::from_slice(&actix_test::read_body(register_res).await).expect("payload");

        let login_req = actix_test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({ "username": "freya", "password": "correct horse" }))
            .to_request();
        let login_res = actix_test::call_service(&app, login_req).await;
        assert_eq!(login_res.status(), actix_web::http::StatusCode::OK);
        let session: Value =
            serde_json::from_slice(&actix_test::read_body(login_res).await).expect("payload");
        // Login returns the token minted at registration, not a fresh one.
        assert_eq!(session.get("token"), registered.get("token"));
    }

    #[actix_web::test]
    async fn login_with_wrong_password_is_unauthorized() {
        let harness = TestHarness::new();
        let app = identity_app!(harness);

        let register_req = actix_test::TestRequest::post()
            .uri("/api/registration/")
            .set_json(registration_body("freya", "business"))
            .to_request();
        actix_test::call_service(&app, register_req).await;

        let login_req = actix_test::TestRequest::post()
            .uri("/api/login/")
            .set_json(json!({ "username": "freya", "password": "wrong" }))
            .to_request();
        let response = actix_test::call_service(&app, login_req).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn garbled_activation_link_reports_invalid() {
        let harness = TestHarness::new();
        let app = identity_app!(harness);

        let request = actix_test::TestRequest::get()
            .uri("/api/activate/not-base64/not-a-token/")
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn unknown_reset_token_reports_invalid_status() {
        let harness = TestHarness::new();
        let app = identity_app!(harness);

        let request = actix_test::TestRequest::post()
            .uri("/api/password-reset/check/")
            .set_json(json!({ "token": "feedbeef" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);
        let value: Value =
            serde_json::from_slice(&actix_test::read_body(response).await).expect("payload");
        assert_eq!(value.get("status").and_then(Value::as_str), Some("invalid"));
    }

    #[actix_web::test]
    async fn verify_token_requires_authentication() {
        let harness = TestHarness::new();
        let app = identity_app!(harness);

        let request = actix_test::TestRequest::post()
            .uri("/api/verify-token/")
            .set_json(json!({ "token": "whatever" }))
            .to_request();
        let response = actix_test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn verify_token_confirms_the_seeded_token() {
        let harness = TestHarness::new();
        let (_, bearer) = harness
            .seed_active_user("sigrid", crate::domain::UserRole::Customer)
            .await;
        let app = identity_app!(harness);

        let matching = actix_test::TestRequest::post()
            .uri("/api/verify-token/")
            .insert_header(("Authorization", format!("Token {bearer}")))
            .set_json(json!({ "token": bearer }))
            .to_request();
        let response = actix_test::call_service(&app, matching).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::OK);

        let stale = actix_test::TestRequest::post()
            .uri("/api/verify-token/")
            .insert_header(("Authorization", format!("Token {bearer}")))
            .set_json(json!({ "token": "0000" }))
            .to_request();
        let response = actix_test::call_service(&app, stale).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }
}
