//! Access/refresh claim construction and token pair issuance.
//!
//! Issuance is stateless: nothing is stored and earlier pairs for the same
//! identity stay valid until they expire.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::identity::Identity;
use crate::jwt::{self, ACCESS_TOKEN_TYPE, Claims, JwtError};
use crate::policy::AuthPolicy;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// `now + lifetime` as a Unix timestamp. Never panics, whatever the lifetime.
fn expiry(now: DateTime<Utc>, lifetime: Duration) -> i64 {
    now.timestamp().saturating_add(lifetime.num_seconds())
}

pub fn build_access_claims(identity: &Identity, policy: &AuthPolicy, now: DateTime<Utc>) -> Claims {
    Claims {
        sub: identity.id.to_string(),
        iss: Some(policy.issuer.clone()),
        aud: Some(policy.audience.clone()),
        iat: now.timestamp(),
        exp: expiry(now, policy.access_lifetime),
        name: Some(identity.display_name()),
        typ: Some(ACCESS_TOKEN_TYPE.to_string()),
    }
}

/// Refresh claims are kept to subject and timestamps so a leaked refresh
/// token reveals as little as possible.
pub fn build_refresh_claims(
    identity: &Identity,
    policy: &AuthPolicy,
    now: DateTime<Utc>,
) -> Claims {
    Claims {
        sub: identity.id.to_string(),
        iss: None,
        aud: None,
        iat: now.timestamp(),
        exp: expiry(now, policy.refresh_lifetime),
        name: None,
        typ: None,
    }
}

pub fn issue_pair(
    identity: &Identity,
    policy: &AuthPolicy,
    now: DateTime<Utc>,
) -> Result<TokenPair, JwtError> {
    let access_token = jwt::sign(&build_access_claims(identity, policy, now), policy)?;
    let refresh_token = jwt::sign(&build_refresh_claims(identity, policy, now), policy)?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}
