//! Process-wide auth policy.
//!
//! Built once at startup and shared read-only behind an `Arc`. Every issuance
//! and verification decision is a pure function of this value plus its inputs.

use chrono::Duration;
use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::auth::SameSite;

/// Access token lifetime: 15 minutes
pub const DEFAULT_ACCESS_TOKEN_SECS: i64 = 15 * 60;

/// Refresh token lifetime: 24 hours
pub const DEFAULT_REFRESH_TOKEN_SECS: i64 = 24 * 60 * 60;

/// Upper bound for either lifetime: 10 years
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 10 * 365 * 24 * 60 * 60;

pub const DEFAULT_COOKIE_NAME: &str = "gus_refresh_token";
pub const DEFAULT_COOKIE_PATH: &str = "/";

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("token lifetimes must be positive")]
    NonPositiveLifetime,
    #[error("token lifetimes cannot exceed 10 years")]
    LifetimeTooLong,
    #[error("access token lifetime must be shorter than refresh token lifetime")]
    AccessOutlivesRefresh,
    #[error("cookie name cannot be empty")]
    EmptyCookieName,
}

/// HMAC keys derived from the signing secret. The secret itself is not kept.
#[derive(Clone)]
pub struct SigningKeys {
    pub(crate) encoding: EncodingKey,
    pub(crate) decoding: DecodingKey,
}

impl SigningKeys {
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKeys(<redacted>)")
    }
}

#[derive(Debug, Clone)]
pub struct AuthPolicy {
    pub issuer: String,
    pub audience: String,
    pub keys: SigningKeys,
    pub access_lifetime: Duration,
    pub refresh_lifetime: Duration,
    pub cookie_name: String,
    pub cookie_path: String,
    /// Left out of emitted cookies when `None`.
    pub cookie_domain: Option<String>,
    pub cookie_same_site: SameSite,
}

impl AuthPolicy {
    /// Policy with the default lifetimes and cookie settings.
    pub fn new(issuer: impl Into<String>, audience: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            keys: SigningKeys::from_secret(secret),
            access_lifetime: Duration::seconds(DEFAULT_ACCESS_TOKEN_SECS),
            refresh_lifetime: Duration::seconds(DEFAULT_REFRESH_TOKEN_SECS),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            cookie_path: DEFAULT_COOKIE_PATH.to_string(),
            cookie_domain: None,
            // Lax so a frontend on a separate origin in development still
            // sends the cookie.
            cookie_same_site: SameSite::Lax,
        }
    }

    pub fn with_lifetimes(
        mut self,
        access_secs: i64,
        refresh_secs: i64,
    ) -> Result<Self, PolicyError> {
        if access_secs <= 0 || refresh_secs <= 0 {
            return Err(PolicyError::NonPositiveLifetime);
        }
        if access_secs > MAX_TOKEN_LIFETIME_SECS || refresh_secs > MAX_TOKEN_LIFETIME_SECS {
            return Err(PolicyError::LifetimeTooLong);
        }
        if access_secs >= refresh_secs {
            return Err(PolicyError::AccessOutlivesRefresh);
        }
        self.access_lifetime =
            Duration::try_seconds(access_secs).ok_or(PolicyError::LifetimeTooLong)?;
        self.refresh_lifetime =
            Duration::try_seconds(refresh_secs).ok_or(PolicyError::LifetimeTooLong)?;
        Ok(self)
    }

    pub fn with_cookie(
        mut self,
        name: impl Into<String>,
        path: impl Into<String>,
        domain: Option<String>,
    ) -> Result<Self, PolicyError> {
        let name = name.into();
        if name.is_empty() {
            return Err(PolicyError::EmptyCookieName);
        }
        self.cookie_name = name;
        self.cookie_path = path.into();
        self.cookie_domain = domain.filter(|d| !d.is_empty());
        Ok(self)
    }

    pub fn with_same_site(mut self, same_site: SameSite) -> Self {
        self.cookie_same_site = same_site;
        self
    }
}
