use std::future::{ready, Ready};

use actix_web::{dev::Payload, http::header::AUTHORIZATION, web::Data, FromRequest, HttpRequest};

use crate::error::ApiError;

/// Bearer token expected on admin routes.
///
/// Tokens are issued by the identity service in front of this backend, the
/// routes stay open when none is configured.
#[derive(Debug, Clone, Default)]
pub struct AdminToken(pub Option<String>);

/// Extracting this guard rejects the request unless it carries the admin token.
#[derive(Debug)]
pub struct Admin;

impl FromRequest for Admin {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(authorize(req))
    }
}

fn authorize(req: &HttpRequest) -> Result<Admin, ApiError> {
    let expected = match req.app_data::<Data<AdminToken>>().and_then(|t| t.0.as_deref()) {
        Some(token) => token,
        None => return Ok(Admin),
    };

    let given = req
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match given {
        Some(token) if tokens_match(token.as_bytes(), expected.as_bytes()) => Ok(Admin),
        _ => Err(ApiError::Unauthorized),
    }
}

/// Compares in time that depends only on the lengths, not on where the first
/// differing byte sits.
fn tokens_match(given: &[u8], expected: &[u8]) -> bool {
    if given.len() != expected.len() {
        return false;
    }
    given
        .iter()
        .zip(expected)
        .fold(0u8, |diff, (a, b)| diff | (a ^ b))
        == 0
}
