//! JWT signing and verification.

use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::policy::AuthPolicy;

/// Algorithm used when signing.
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted when verifying. Anything outside the HMAC family is
/// rejected before the signature is checked.
const HMAC_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Value of the `typ` claim on access tokens.
pub const ACCESS_TOKEN_TYPE: &str = "JWT";

/// Claim set carried by both token kinds.
///
/// Refresh tokens only populate `sub`, `iat` and `exp`; the optional fields
/// are omitted from the encoded payload when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the identity id, string-encoded
    pub sub: String,
    /// Issuer (access only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
    /// Audience (access only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Display name (access only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Token type marker (access only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typ: Option<String>,
}

impl Claims {
    /// Parse the subject back into an identity id.
    pub fn subject_id(&self) -> Option<i64> {
        self.sub.parse().ok()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("token has expired")]
    Expired,
    #[error("invalid token: {0}")]
    Invalid(jsonwebtoken::errors::Error),
}

/// Sign a claim set with the policy's HMAC key.
pub fn sign(claims: &Claims, policy: &AuthPolicy) -> Result<String, JwtError> {
    jsonwebtoken::encode(
        &Header::new(SIGNING_ALGORITHM),
        claims,
        &policy.keys.encoding,
    )
    .map_err(JwtError::Signing)
}

/// Verify a token's algorithm, signature and expiry, then decode its claims.
///
/// A token is valid while `iat <= now < exp`. Issuer and audience are not
/// checked here.
pub fn verify(token: &str, policy: &AuthPolicy) -> Result<Claims, JwtError> {
    let mut validation = Validation::new(SIGNING_ALGORITHM);
    validation.algorithms = HMAC_ALGORITHMS.to_vec();
    validation.leeway = 0;
    validation.validate_aud = false;

    let claims = jsonwebtoken::decode::<Claims>(token, &policy.keys.decoding, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => JwtError::Expired,
            _ => JwtError::Invalid(e),
        })?;

    // jsonwebtoken only rejects `exp < now`.
    if claims.exp <= Utc::now().timestamp() {
        return Err(JwtError::Expired);
    }

    Ok(claims)
}
