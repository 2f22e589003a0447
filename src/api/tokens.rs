//! Token issuance endpoints.
//!
//! - POST `/authenticate` - Exchange email and password for a token pair
//! - GET `/refresh` - Exchange the refresh cookie for a new token pair
//! - GET `/logout` - Clear the refresh cookie

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderName, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, error, info};

use super::AppState;
use super::error::{ApiError, ResultExt};
use crate::auth::{encode_expired_cookie, encode_refresh_cookie, get_cookie};
use crate::identity::{IdentitySource, User};
use crate::jwt;
use crate::token::{TokenPair, issue_pair};

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct Credentials {
    email: String,
    password: String,
}

type IssuedPair = (StatusCode, [(HeaderName, String); 1], Json<TokenPair>);

fn invalid_credentials() -> ApiError {
    ApiError::bad_request("invalid credentials")
}

/// Issue a token pair for `user`: the pair goes in the JSON body and the
/// refresh token is also set as a cookie.
fn issue_for<D: IdentitySource>(
    state: &AppState<D>,
    user: &User,
    status: StatusCode,
) -> Result<IssuedPair, ApiError> {
    let now = Utc::now();
    let pair = issue_pair(&user.identity(), &state.policy, now).map_err(|e| {
        error!(user_id = user.id, error = %e, "Failed to sign token pair");
        ApiError::internal("Failed to generate token")
    })?;

    let cookie = encode_refresh_cookie(&pair.refresh_token, &state.policy, now);

    Ok((status, [(SET_COOKIE, cookie.to_header_value())], Json(pair)))
}

/// Body problems (bad JSON, wrong content type, unknown fields) come back
/// as a 400 in the usual JSON envelope.
pub(super) async fn authenticate<D: IdentitySource>(
    State(state): State<AppState<D>>,
    credentials: Result<Json<Credentials>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(credentials) = credentials.map_err(|rejection| {
        debug!(error = %rejection.body_text(), "Rejected login body");
        ApiError::bad_request(rejection.body_text())
    })?;

    let user = state
        .users
        .get_user_by_email(&credentials.email)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(invalid_credentials)?;

    if !user.password_matches(&credentials.password) {
        debug!(user_id = user.id, "Password mismatch");
        return Err(invalid_credentials());
    }

    let response = issue_for(&state, &user, StatusCode::ACCEPTED)?;
    info!(user_id = user.id, "Issued token pair");
    Ok(response)
}

/// The refresh token carries no issuer, so it is checked with a plain
/// signature/expiry verification rather than bearer authentication.
pub(super) async fn refresh<D: IdentitySource>(
    State(state): State<AppState<D>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let token = get_cookie(&headers, &state.policy.cookie_name).ok_or_else(|| {
        debug!("Refresh requested without a refresh cookie");
        ApiError::unauthorized()
    })?;

    let claims = jwt::verify(token, &state.policy).map_err(|e| {
        debug!(error = %e, "Rejected refresh token");
        ApiError::unauthorized()
    })?;

    let user_id = claims.subject_id().ok_or_else(|| {
        debug!(sub = %claims.sub, "Refresh token subject is not a user id");
        ApiError::unauthorized()
    })?;

    let user = state
        .users
        .get_user_by_id(user_id)
        .await
        .db_err("Failed to look up user")?
        .ok_or_else(|| {
            debug!(user_id, "Refresh token subject no longer exists");
            ApiError::unauthorized()
        })?;

    let response = issue_for(&state, &user, StatusCode::OK)?;
    info!(user_id = user.id, "Refreshed token pair");
    Ok(response)
}

/// Tell the browser to drop the refresh cookie.
///
/// Tokens are not revoked server-side: a refresh token copied before logout
/// keeps working until it expires.
pub(super) async fn logout<D: IdentitySource>(
    State(state): State<AppState<D>>,
) -> impl IntoResponse {
    let cookie = encode_expired_cookie(&state.policy);
    (StatusCode::ACCEPTED, [(SET_COOKIE, cookie.to_header_value())])
}
