use clap::Parser;
use gus_auth::cli::{
    Args, build_config, build_policy, handle_create_user, init_logging, load_jwt_secret,
    open_database,
};
use gus_auth::create_app;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let args = Args::parse();

    init_logging(&args.log_format);

    let Some(jwt_secret) = load_jwt_secret(args.jwt_secret_file.as_deref()) else {
        std::process::exit(1);
    };

    let policy = match build_policy(&args, &jwt_secret) {
        Ok(policy) => policy,
        Err(e) => {
            error!(error = %e, "Invalid auth configuration");
            std::process::exit(1);
        }
    };

    let Some(db) = open_database(&args.database).await else {
        std::process::exit(1);
    };

    if let (Some(email), Some(first_name), Some(last_name)) =
        (&args.create_user, &args.first_name, &args.last_name)
    {
        handle_create_user(&db, email, first_name, last_name).await;
    }

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .unwrap_or_else(|e| {
            error!(address = %addr, error = %e, "Failed to bind");
            std::process::exit(1);
        });

    let config = build_config(db, policy);
    let app = create_app(&config);

    match listener.local_addr() {
        Ok(local_addr) => info!(
            address = %local_addr,
            issuer = %config.policy.issuer,
            access_ttl_secs = config.policy.access_lifetime.num_seconds(),
            refresh_ttl_secs = config.policy.refresh_lifetime.num_seconds(),
            "Listening"
        ),
        Err(e) => error!(error = %e, "Failed to read local address"),
    }

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "Server error");
        std::process::exit(1);
    }
}
