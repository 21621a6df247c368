//! Bearer-token authentication for HTTP handlers.
//!
//! Clients present `Authorization: Token <key>`; the extractor resolves the
//! key to an [`Actor`] through the identity service so handlers never touch
//! raw credentials.

use actix_web::{FromRequest, HttpRequest, dev::Payload, web};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Actor, Error, User};
use crate::inbound::http::state::HttpState;

/// Authorization scheme expected in the header value.
pub const AUTH_SCHEME: &str = "Token";

fn token_from_header(req: &HttpRequest) -> Result<String, Error> {
    let header = req
        .headers()
        .get(actix_web::http::header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("authentication credentials were not provided"))?;
    let value = header
        .to_str()
        .map_err(|_| Error::unauthorized("invalid authorization header"))?;
    let (scheme, key) = value
        .split_once(' ')
        .ok_or_else(|| Error::unauthorized("invalid authorization header"))?;
    if scheme != AUTH_SCHEME || key.trim().is_empty() {
        return Err(Error::unauthorized("invalid authorization header"));
    }
    Ok(key.trim().to_owned())
}

/// The authenticated caller, resolved from the request's bearer token.
pub struct Authenticated {
    pub actor: Actor,
    pub user: User,
}

impl FromRequest for Authenticated {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let token = token_from_header(req);
        Box::pin(async move {
            let state =
                state.ok_or_else(|| Error::internal("http state is not configured"))?;
            let token = token?;
            let (actor, user) = state.identity.authenticate(&token).await?;
            Ok(Self { actor, user })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use actix_web::test::TestRequest;
    use rstest::rstest;

    fn request_with_authorization(value: &str) -> HttpRequest {
        TestRequest::default()
            .insert_header(("Authorization", value))
            .to_http_request()
    }

    #[test]
    fn extracts_the_key_from_a_well_formed_header() {
        let req = request_with_authorization("Token abcdef0123456789");
        assert_eq!(
            token_from_header(&req).expect("token"),
            "abcdef0123456789"
        );
    }

    #[test]
    fn missing_header_is_unauthorized() {
        let req = TestRequest::default().to_http_request();
        let err = token_from_header(&req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "authentication credentials were not provided");
    }

    #[rstest]
    #[case("Bearer abcdef")]
    #[case("Token")]
    #[case("Token    ")]
    #[case("abcdef")]
    fn rejects_malformed_headers(#[case] value: &str) {
        let req = request_with_authorization(value);
        let err = token_from_header(&req).unwrap_err();
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), "invalid authorization header");
    }
}
