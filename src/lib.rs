pub mod api;
pub mod auth;
pub mod cli;
pub mod db;
pub mod identity;
pub mod jwt;
pub mod policy;
pub mod token;

use api::{AppState, create_api_router};
use axum::{Router, extract::MatchedPath, http::Request, routing::get};
use db::Database;
use policy::AuthPolicy;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::info_span;

pub struct ServerConfig {
    /// Identity source (cloneable, uses connection pool internally)
    pub db: Database,
    /// Issuer, audience, signing keys, lifetimes and cookie settings
    pub policy: AuthPolicy,
}

/// Create the application router with the given configuration.
pub fn create_app(config: &ServerConfig) -> Router {
    let state = AppState {
        policy: Arc::new(config.policy.clone()),
        users: config.db.clone(),
    };

    Router::new()
        .route("/", get(|| async { "gus-auth" }))
        .merge(create_api_router(state))
        .layer(CatchPanicLayer::new())
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<_>| {
                let matched_path = request
                    .extensions()
                    .get::<MatchedPath>()
                    .map(MatchedPath::as_str);

                info_span!("request", method = ?request.method(), matched_path)
            }),
        )
}

/// Run the server on the given listener. This function blocks until the server exits.
pub async fn run_server(config: ServerConfig, listener: TcpListener) -> Result<(), std::io::Error> {
    let app = create_app(&config);
    axum::serve(listener, app).await
}

/// Start the server on the given port in a background task. Use port 0 to let the OS choose a random port.
/// Returns the actual address the server is listening on.
pub async fn start_server(
    config: ServerConfig,
    port: u16,
) -> Result<(tokio::task::JoinHandle<()>, SocketAddr), std::io::Error> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", port)).await?;
    let local_addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        if let Err(e) = run_server(config, listener).await {
            tracing::error!(error = %e, "Server error");
        }
    });

    Ok((handle, local_addr))
}
