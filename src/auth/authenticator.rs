//! Bearer token extraction and verification.

use axum::http::{HeaderMap, HeaderValue, header};

use super::errors::AuthError;
use crate::jwt::{self, Claims};
use crate::policy::AuthPolicy;

const BEARER_SCHEME: &str = "Bearer";

/// Authenticate a request from its `Authorization: Bearer <token>` header.
///
/// `Vary: Authorization` is appended to `response_headers` before any check
/// runs, so it is present whatever the outcome. On success the raw token is
/// returned alongside its claims.
///
/// The audience claim is not compared against the policy.
pub fn authenticate(
    request_headers: &HeaderMap,
    response_headers: &mut HeaderMap,
    policy: &AuthPolicy,
) -> Result<(String, Claims), AuthError> {
    response_headers.append(header::VARY, HeaderValue::from_static("Authorization"));

    let auth_header = request_headers
        .get(header::AUTHORIZATION)
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::MalformedHeader)?;

    if auth_header.is_empty() {
        return Err(AuthError::MissingHeader);
    }

    let parts: Vec<&str> = auth_header.split(' ').collect();
    let [scheme, token] = parts.as_slice() else {
        return Err(AuthError::MalformedHeader);
    };

    if *scheme != BEARER_SCHEME {
        return Err(AuthError::MalformedHeader);
    }

    let claims = jwt::verify(token, policy)?;

    if claims.iss.as_deref() != Some(policy.issuer.as_str()) {
        return Err(AuthError::WrongIssuer);
    }

    Ok((token.to_string(), claims))
}
