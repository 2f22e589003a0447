//! Guard for protected routes.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use super::authenticator::authenticate;
use super::state::HasAuthPolicy;

/// Reject requests without a valid bearer token with a bare 401.
///
/// The wrapped handler receives the request untouched; claims are not
/// forwarded. Handlers that need the caller's identity call
/// [`authenticate`] themselves.
pub async fn require_auth<S>(State(state): State<S>, request: Request, next: Next) -> Response
where
    S: HasAuthPolicy + Clone + Send + Sync + 'static,
{
    let mut vary = HeaderMap::new();

    match authenticate(request.headers(), &mut vary, state.policy()) {
        Ok((_, claims)) => {
            debug!(sub = %claims.sub, "Request authorized");
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            for (name, value) in vary.iter() {
                headers.append(name, value.clone());
            }
            response
        }
        Err(e) => {
            debug!(
                reason = %e,
                method = %request.method(),
                path = %request.uri().path(),
                "Rejected unauthorized request"
            );
            (vary, e).into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::Identity;
    use crate::policy::AuthPolicy;
    use crate::token::issue_pair;
    use axum::{
        Router,
        body::Body,
        http::{StatusCode, header},
        middleware,
        routing::get,
    };
    use chrono::{Duration, Utc};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    fn app(policy: Arc<AuthPolicy>, hits: Arc<AtomicUsize>) -> Router {
        Router::new()
            .route(
                "/protected",
                get(move || {
                    let hits = hits.clone();
                    async move {
                        hits.fetch_add(1, Ordering::SeqCst);
                        "secret stuff"
                    }
                }),
            )
            .route_layer(middleware::from_fn_with_state(
                policy,
                require_auth::<Arc<AuthPolicy>>,
            ))
    }

    fn policy() -> Arc<AuthPolicy> {
        Arc::new(AuthPolicy::new(
            "example.com",
            "example.com",
            b"test-secret-key-for-testing",
        ))
    }

    fn ada() -> Identity {
        Identity {
            id: 42,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
        }
    }

    async fn send(app: Router, authorization: Option<&str>) -> Response {
        let mut request = axum::http::Request::builder().uri("/protected");
        if let Some(value) = authorization {
            request = request.header(header::AUTHORIZATION, value);
        }
        app.oneshot(request.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_header_never_reaches_handler() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = send(app(policy(), hits.clone()), None).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers().get(header::VARY).unwrap(), "Authorization");
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler() {
        let policy = policy();
        let hits = Arc::new(AtomicUsize::new(0));
        let pair = issue_pair(&ada(), &policy, Utc::now()).unwrap();

        let response = send(
            app(policy, hits.clone()),
            Some(&format!("Bearer {}", pair.access_token)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(header::VARY).unwrap(), "Authorization");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_token_is_rejected() {
        let policy = policy();
        let hits = Arc::new(AtomicUsize::new(0));
        let pair = issue_pair(&ada(), &policy, Utc::now() - Duration::minutes(16)).unwrap();

        let response = send(
            app(policy, hits.clone()),
            Some(&format!("Bearer {}", pair.access_token)),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_wrong_scheme_is_rejected() {
        let hits = Arc::new(AtomicUsize::new(0));
        let response = send(app(policy(), hits.clone()), Some("Basic dXNlcjpwYXNz")).await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }
}
