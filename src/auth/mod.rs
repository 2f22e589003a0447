//! Bearer-token request authentication and refresh-cookie handling.
//!
//! Access tokens are presented as `Authorization: Bearer <token>`; refresh
//! tokens only ever travel in an HttpOnly cookie. Nothing here touches storage.

mod authenticator;
mod cookie;
mod errors;
mod middleware;
mod state;

pub use authenticator::authenticate;
pub use cookie::{Cookie, SameSite, encode_expired_cookie, encode_refresh_cookie, get_cookie};
pub use errors::AuthError;
pub use middleware::require_auth;
pub use state::HasAuthPolicy;
