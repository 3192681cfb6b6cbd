//! # tasklist: a small multi-user todo service
//!
//! `tasklist` is a self-hostable todo-list service with token-based
//! authentication. It provides a RESTful API for registration, login, per-user
//! todo management, and an admin surface for user administration and
//! instance-wide statistics.
//!
//! ## Overview
//!
//! Every account owns its todos outright: users only ever see and modify their
//! own rows, while admin accounts can additionally list all users with their
//! todo statistics, delete accounts, promote users to admin, and inspect every
//! todo in the system. All state lives in a single SQLite database, which keeps
//! deployment down to one binary and one file.
//!
//! ### Request Flow
//!
//! A client logs in with email and password at `/api/login` and receives a
//! signed bearer token. Each protected request then passes through two gates:
//!
//! 1. **Access gate**: the [`api::models::users::CurrentUser`] extractor reads
//!    the `Authorization: Bearer` header, verifies the token signature and
//!    expiry, and resolves the subject against the `users` table. Any failure
//!    answers `401` before the handler body runs.
//! 2. **Role gate**: admin handlers call
//!    [`auth::current_user::require_admin`] first, answering `403` for
//!    non-admin callers.
//!
//! Handlers then talk to the database through repository interfaces
//! ([`db::handlers`]) and serialize responses from the models in
//! [`api::models`].
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use tasklist::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = tasklist::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     tasklist::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application uses SQLite and automatically runs migrations on startup:
//!
//! ```no_run
//! # use sqlx::SqlitePool;
//! # async fn example(pool: SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
//! // Run migrations
//! tasklist::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod telemetry;
mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use crate::{
    api::ApiDoc,
    auth::password,
    config::CorsOrigin,
    db::handlers::{Repository, Users},
    db::models::users::{UserCreateDBRequest, UserUpdateDBRequest},
};
use axum::http::{HeaderValue, Method, header};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
pub use config::Config;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{TodoId, UserId};

/// Application state shared across all request handlers.
///
/// Cheap to clone: the pool is reference-counted and the config is small.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Config,
}

/// Get the tasklist database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Ensure the initial admin user exists.
///
/// This function is idempotent - it creates the admin account named in the
/// config if absent, and otherwise re-asserts its admin flag and (when a
/// password is configured) resets its password. It is called during
/// application startup so there is always an admin available.
///
/// Looks the account up by `admin_email`; `admin_username` is only used at
/// creation time.
///
/// # Returns
///
/// Returns the user ID of the created or existing admin user.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(config: &Config, db: &SqlitePool) -> Result<UserId, sqlx::Error> {
    // Hash password if provided
    let password_hash = if let Some(pwd) = config.admin_password.as_deref() {
        let params = config.auth.password.argon2_params();
        Some(
            password::hash_string_with_params(pwd, Some(params))
                .map_err(|e| sqlx::Error::Encode(format!("Failed to hash admin password: {e}").into()))?,
        )
    } else {
        None
    };

    // Use a transaction to ensure atomicity
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    // Check if user already exists
    if let Some(existing_user) = user_repo
        .get_user_by_email(&config.admin_email)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to check existing user: {e}")))?
    {
        // User exists - re-assert the admin flag, reset password if configured
        let update = UserUpdateDBRequest {
            is_admin: Some(true),
            password_hash,
        };
        user_repo
            .update(existing_user.id, &update)
            .await
            .map_err(|e| sqlx::Error::Protocol(format!("Failed to update admin user: {e}")))?;

        tx.commit().await?;
        info!(user_id = existing_user.id, "Admin user already present");
        return Ok(existing_user.id);
    }

    // Create new admin user
    let user_create = UserCreateDBRequest {
        username: config.admin_username.clone(),
        email: config.admin_email.clone(),
        password_hash: password_hash.unwrap_or_default(),
        is_admin: true,
    };

    let created_user = user_repo
        .create(&user_create)
        .await
        .map_err(|e| sqlx::Error::Protocol(format!("Failed to create admin user: {e}")))?;

    tx.commit().await?;
    info!(user_id = created_user.id, email = %config.admin_email, "Created initial admin user");
    Ok(created_user.id)
}

/// Open the SQLite pool, run migrations, and ensure the admin user.
async fn setup_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let in_memory = config.database.path == ":memory:";

    let mut options = SqliteConnectOptions::new()
        .filename(&config.database.path)
        .create_if_missing(true)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));
    if !in_memory {
        options = options.journal_mode(SqliteJournalMode::Wal);
    }

    // An in-memory database exists per connection, so the pool must
    // hold exactly one and never recycle it
    let pool_options = if in_memory {
        SqlitePoolOptions::new().max_connections(1).idle_timeout(None).max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    info!(path = %config.database.path, "Opening database");
    let pool = pool_options.connect_with(options).await?;
    migrator().run(&pool).await?;

    create_initial_admin_user(config, &pool)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create initial admin user: {}", e))?;

    Ok(pool)
}

/// Create CORS layer from configuration
fn create_cors_layer(config: &Config) -> anyhow::Result<CorsLayer> {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // tower-http rejects "*" inside an origin list, so wildcard switches modes
    let has_wildcard = config.cors.allowed_origins.iter().any(|o| matches!(o, CorsOrigin::Wildcard));
    let cors = if has_wildcard {
        cors.allow_origin(tower_http::cors::Any)
    } else {
        let mut origins = Vec::new();
        for origin in &config.cors.allowed_origins {
            if let CorsOrigin::Url(url) = origin {
                origins.push(url.origin().ascii_serialization().parse::<HeaderValue>()?);
            }
        }
        cors.allow_origin(origins)
    };

    Ok(cors)
}

/// Build the main application router with all endpoints and middleware.
///
/// This function constructs the complete Axum router with:
/// - Authentication routes (register, login)
/// - Todo routes (list, create, update, delete)
/// - Admin routes (user management, statistics, cross-user listings)
/// - API documentation at `/docs`
/// - CORS configuration
/// - Tracing middleware
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    let cors_layer = create_cors_layer(&state.config)?;

    let router = Router::new()
        .route("/healthz", get(|| async { "OK" }))
        .route("/api/register", post(api::handlers::auth::register))
        .route("/api/login", post(api::handlers::auth::login))
        .route(
            "/api/todos",
            get(api::handlers::todos::list_todos).post(api::handlers::todos::create_todo),
        )
        .route(
            "/api/todos/{id}",
            put(api::handlers::todos::update_todo).delete(api::handlers::todos::delete_todo),
        )
        .route("/api/admin/users", get(api::handlers::admin::list_users))
        .route("/api/admin/users/{id}", delete(api::handlers::admin::delete_user))
        .route("/api/admin/users/{id}/make-admin", put(api::handlers::admin::make_admin))
        .route("/api/admin/stats", get(api::handlers::admin::stats))
        .route("/api/admin/todos", get(api::handlers::admin::list_all_todos))
        .with_state(state)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(cors_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    Ok(router)
}

/// The assembled application: router, state, and database pool.
pub struct Application {
    router: Router,
    config: Config,
    pool: SqlitePool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        debug!("Starting tasklist with configuration: {:#?}", config);

        // Open the database, run migrations, and ensure the admin user
        let pool = setup_database(&config).await?;

        let app_state = AppState {
            db: pool.clone(),
            config: config.clone(),
        };
        let router = build_router(app_state)?;

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(any(test, feature = "test-utils"))]
    pub fn into_test_server(self) -> anyhow::Result<axum_test::TestServer> {
        axum_test::TestServer::new(self.router)
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!(
            "Tasklist listening on http://{}, available at http://localhost:{}",
            bind_addr, self.config.port
        );

        // Run the server with graceful shutdown
        axum::serve(listener, self.router).with_graceful_shutdown(shutdown).await?;

        // Close database connections
        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
