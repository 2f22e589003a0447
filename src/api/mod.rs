mod admin;
mod error;
mod tokens;

use axum::{
    Router, middleware,
    routing::{get, post},
};
use std::sync::Arc;

use crate::auth::{HasAuthPolicy, require_auth};
use crate::identity::IdentitySource;
use crate::policy::AuthPolicy;

pub use error::{ApiError, JsonResponse};

/// Shared handler state: the immutable policy and the identity lookup.
#[derive(Clone)]
pub struct AppState<D: IdentitySource> {
    pub policy: Arc<AuthPolicy>,
    pub users: D,
}

impl<D: IdentitySource> HasAuthPolicy for AppState<D> {
    fn policy(&self) -> &AuthPolicy {
        &self.policy
    }
}

/// Create the API router.
pub fn create_api_router<D: IdentitySource>(state: AppState<D>) -> Router {
    let admin_router = Router::new()
        .route("/session", get(admin::session))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_auth::<AppState<D>>,
        ));

    Router::new()
        .route("/authenticate", post(tokens::authenticate::<D>))
        .route("/refresh", get(tokens::refresh::<D>))
        .route("/logout", get(tokens::logout::<D>))
        .nest("/admin", admin_router)
        .with_state(state)
}
