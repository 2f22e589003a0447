//! Authentication error types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::jwt::JwtError;

/// Why a request failed authentication.
///
/// The reason is for logs only. Every variant renders the same bare 401 so
/// clients cannot probe which check failed.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("no authorization header")]
    MissingHeader,
    #[error("malformed authorization header")]
    MalformedHeader,
    #[error("token has expired")]
    Expired,
    #[error("invalid token")]
    Invalid,
    #[error("token issued by another issuer")]
    WrongIssuer,
}

impl From<JwtError> for AuthError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::Expired => AuthError::Expired,
            JwtError::Invalid(_) | JwtError::Signing(_) => AuthError::Invalid,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        StatusCode::UNAUTHORIZED.into_response()
    }
}
