//! CLI argument parsing, validation, and startup helpers.

use crate::ServerConfig;
use crate::auth::SameSite;
use crate::db::Database;
use crate::policy::{
    AuthPolicy, DEFAULT_ACCESS_TOKEN_SECS, DEFAULT_COOKIE_NAME, DEFAULT_COOKIE_PATH,
    DEFAULT_REFRESH_TOKEN_SECS, PolicyError,
};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const MIN_JWT_SECRET_LENGTH: usize = 32;

#[derive(clap::ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "gus-auth",
    about = "Access/refresh token issuance and bearer authentication"
)]
pub struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PORT")]
    pub port: u16,

    /// Path to SQLite database file
    #[arg(short, long, default_value = "gus-auth.db")]
    pub database: String,

    /// Path to file containing JWT secret. Prefer using JWT_SECRET env var instead
    #[arg(long)]
    pub jwt_secret_file: Option<String>,

    /// Issuer placed in access tokens and required on bearer tokens
    #[arg(long, default_value = "example.com", env = "JWT_ISSUER")]
    pub jwt_issuer: String,

    /// Audience placed in access tokens
    #[arg(long, default_value = "example.com", env = "JWT_AUDIENCE")]
    pub jwt_audience: String,

    /// Access token lifetime in seconds
    #[arg(long, default_value_t = DEFAULT_ACCESS_TOKEN_SECS)]
    pub access_token_ttl: i64,

    /// Refresh token lifetime in seconds
    #[arg(long, default_value_t = DEFAULT_REFRESH_TOKEN_SECS)]
    pub refresh_token_ttl: i64,

    /// Name of the refresh token cookie
    #[arg(long, default_value = DEFAULT_COOKIE_NAME)]
    pub cookie_name: String,

    /// Path attribute of the refresh token cookie
    #[arg(long, default_value = DEFAULT_COOKIE_PATH)]
    pub cookie_path: String,

    /// Domain attribute of the refresh token cookie (omitted when unset)
    #[arg(long, env = "COOKIE_DOMAIN")]
    pub cookie_domain: Option<String>,

    /// SameSite attribute of the refresh token cookie
    #[arg(long, value_enum, default_value = "lax")]
    pub cookie_same_site: SameSite,

    /// Create a user with this email on startup. The password is read from USER_PASSWORD
    #[arg(long, requires_all = ["first_name", "last_name"])]
    pub create_user: Option<String>,

    /// First name for --create-user
    #[arg(long)]
    pub first_name: Option<String>,

    /// Last name for --create-user
    #[arg(long)]
    pub last_name: Option<String>,

    /// Log output format
    #[arg(short, long, default_value = "pretty")]
    pub log_format: LogFormat,
}

/// Initialize logging based on the specified format.
/// Filtering follows RUST_LOG and defaults to `info`.
pub fn init_logging(format: &LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    match format {
        LogFormat::Pretty => builder.init(),
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
    }
}

/// Load JWT secret from environment variable or file.
/// Returns None and logs an error if the secret cannot be loaded.
pub fn load_jwt_secret(jwt_secret_file: Option<&str>) -> Option<String> {
    let secret = if let Ok(secret) = std::env::var("JWT_SECRET") {
        // Clear the environment variable to prevent leaking
        // SAFETY: We're single-threaded at this point during startup,
        // and no other code is reading this environment variable.
        unsafe { std::env::remove_var("JWT_SECRET") };
        secret
    } else if let Some(path) = jwt_secret_file {
        match std::fs::read_to_string(path) {
            Ok(content) => content.trim().to_string(),
            Err(e) => {
                error!(path = %path, error = %e, "Failed to read JWT secret file");
                return None;
            }
        }
    } else {
        error!(
            "JWT secret is required. Set JWT_SECRET environment variable (recommended) or use --jwt-secret-file"
        );
        return None;
    };

    if secret.len() < MIN_JWT_SECRET_LENGTH {
        error!(
            "JWT secret is shorter than {} characters. Use a longer secret",
            MIN_JWT_SECRET_LENGTH
        );
        return None;
    }

    Some(secret)
}

/// Build the auth policy from validated arguments.
pub fn build_policy(args: &Args, jwt_secret: &str) -> Result<AuthPolicy, PolicyError> {
    AuthPolicy::new(&args.jwt_issuer, &args.jwt_audience, jwt_secret.as_bytes())
        .with_lifetimes(args.access_token_ttl, args.refresh_token_ttl)?
        .with_cookie(
            &args.cookie_name,
            &args.cookie_path,
            args.cookie_domain.clone(),
        )
        .map(|policy| policy.with_same_site(args.cookie_same_site))
}

/// Build ServerConfig from an opened database and policy.
pub fn build_config(db: Database, policy: AuthPolicy) -> ServerConfig {
    ServerConfig { db, policy }
}

/// Open the database, logging errors if it fails.
pub async fn open_database(path: &str) -> Option<Database> {
    match Database::open(path).await {
        Ok(db) => {
            info!(path = %path, "Database opened");
            Some(db)
        }
        Err(e) => {
            error!(path = %path, error = %e, "Failed to open database");
            None
        }
    }
}

/// Handle the --create-user flag: hash USER_PASSWORD and insert the user.
/// Exits the process on failure.
pub async fn handle_create_user(db: &Database, email: &str, first_name: &str, last_name: &str) {
    let Ok(password) = std::env::var("USER_PASSWORD") else {
        error!("--create-user requires the USER_PASSWORD environment variable");
        std::process::exit(1);
    };
    // SAFETY: still single-threaded startup, nothing else reads this variable.
    unsafe { std::env::remove_var("USER_PASSWORD") };

    let password_hash = match bcrypt::hash(&password, bcrypt::DEFAULT_COST) {
        Ok(hash) => hash,
        Err(e) => {
            error!(error = %e, "Failed to hash password");
            std::process::exit(1);
        }
    };

    match db
        .users()
        .create(email, first_name, last_name, &password_hash)
        .await
    {
        Ok(id) => info!(user_id = id, email = %email, "User created"),
        Err(e) => {
            error!(email = %email, error = %e, "Failed to create user");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_policy_defaults() {
        let args = Args::parse_from(["gus-auth"]);
        let policy = build_policy(&args, "0123456789abcdef0123456789abcdef").unwrap();

        assert_eq!(policy.issuer, "example.com");
        assert_eq!(policy.access_lifetime.num_seconds(), 900);
        assert_eq!(policy.refresh_lifetime.num_seconds(), 86_400);
        assert_eq!(policy.cookie_name, "gus_refresh_token");
        assert_eq!(policy.cookie_path, "/");
        assert_eq!(policy.cookie_same_site, SameSite::Lax);
    }

    #[test]
    fn test_custom_lifetimes_and_cookie() {
        let args = Args::parse_from([
            "gus-auth",
            "--access-token-ttl",
            "60",
            "--refresh-token-ttl",
            "3600",
            "--cookie-name",
            "rt",
            "--cookie-domain",
            "example.org",
            "--cookie-same-site",
            "strict",
        ]);
        let policy = build_policy(&args, "0123456789abcdef0123456789abcdef").unwrap();

        assert_eq!(policy.access_lifetime.num_seconds(), 60);
        assert_eq!(policy.refresh_lifetime.num_seconds(), 3600);
        assert_eq!(policy.cookie_name, "rt");
        assert_eq!(policy.cookie_domain.as_deref(), Some("example.org"));
        assert_eq!(policy.cookie_same_site, SameSite::Strict);
    }

    #[test]
    fn test_huge_lifetime_is_an_error_not_a_panic() {
        let args = Args::parse_from([
            "gus-auth",
            "--refresh-token-ttl",
            "9223372036854775807",
        ]);
        assert_eq!(
            build_policy(&args, "0123456789abcdef0123456789abcdef").unwrap_err(),
            PolicyError::LifetimeTooLong
        );
    }

    #[test]
    fn test_inverted_lifetimes_rejected() {
        let args = Args::parse_from([
            "gus-auth",
            "--access-token-ttl",
            "7200",
            "--refresh-token-ttl",
            "3600",
        ]);
        assert_eq!(
            build_policy(&args, "0123456789abcdef0123456789abcdef").unwrap_err(),
            PolicyError::AccessOutlivesRefresh
        );
    }

    #[test]
    fn test_create_user_requires_names() {
        let result = Args::try_parse_from(["gus-auth", "--create-user", "ada@example.com"]);
        assert!(result.is_err());
    }
}
