//! User identity and the lookup interface the auth endpoints depend on.

use std::future::Future;

/// Minimal user projection used to build claims.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
}

impl Identity {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A stored user, as returned by an [`IdentitySource`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

impl User {
    /// Check a plaintext password against the stored bcrypt hash.
    /// A malformed hash counts as a mismatch.
    pub fn password_matches(&self, password: &str) -> bool {
        bcrypt::verify(password, &self.password_hash).unwrap_or(false)
    }

    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Lookup capability injected into the issuance and refresh endpoints.
pub trait IdentitySource: Clone + Send + Sync + 'static {
    type Error: std::fmt::Display + Send;

    fn get_user_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;

    fn get_user_by_id(&self, id: i64)
    -> impl Future<Output = Result<Option<User>, Self::Error>> + Send;
}
