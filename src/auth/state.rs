//! Authentication state trait.

use std::sync::Arc;

use crate::policy::AuthPolicy;

/// Trait for state types that expose the auth policy to [`require_auth`].
///
/// [`require_auth`]: super::require_auth
pub trait HasAuthPolicy {
    fn policy(&self) -> &AuthPolicy;
}

impl HasAuthPolicy for Arc<AuthPolicy> {
    fn policy(&self) -> &AuthPolicy {
        self
    }
}
