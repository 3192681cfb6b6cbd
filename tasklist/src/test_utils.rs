//! Test utilities for integration testing (available with `test-utils` feature).

use crate::api::models::users::CurrentUser;
use crate::auth::password;
use crate::config::{AuthConfig, Config, DatabaseConfig, PasswordConfig};
use crate::db::handlers::{Repository, Users};
use crate::db::models::users::UserCreateDBRequest;
use crate::{AppState, build_router, migrator};
use axum_test::{TestRequest, TestServer};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

/// Password shared by every user created through [`create_test_user`].
pub const TEST_PASSWORD: &str = "password123";

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        database: DatabaseConfig {
            path: ":memory:".to_string(),
        },
        auth: AuthConfig {
            allow_registration: true,
            password: PasswordConfig {
                // Cheap hashing parameters, production cost is pointless here
                argon2_memory_kib: 1024,
                argon2_iterations: 1,
                argon2_parallelism: 1,
                ..Default::default()
            },
            ..Default::default()
        },
        ..Default::default()
    }
}

/// In-memory pool with migrations applied.
///
/// A single connection that is never recycled, because each SQLite in-memory
/// database is private to its connection.
pub async fn create_test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::new().filename(":memory:").foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("Failed to open in-memory database");
    migrator().run(&pool).await.expect("Failed to run migrations");
    pool
}

pub async fn create_test_app() -> (AppState, TestServer) {
    create_test_app_with_config(create_test_config()).await
}

pub async fn create_test_app_with_config(config: Config) -> (AppState, TestServer) {
    let pool = create_test_pool().await;
    let state = AppState { db: pool, config };
    let router = build_router(state.clone()).expect("Failed to build router");
    let server = TestServer::new(router).expect("Failed to create test server");
    (state, server)
}

/// Insert a user directly into the store with password [`TEST_PASSWORD`]
/// and email `<username>@example.com`.
pub async fn create_test_user(state: &AppState, username: &str, is_admin: bool) -> CurrentUser {
    let params = state.config.auth.password.argon2_params();
    let password_hash = password::hash_string_with_params(TEST_PASSWORD, Some(params)).expect("Failed to hash test password");

    let mut conn = state.db.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let user = users_repo
        .create(&UserCreateDBRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash,
            is_admin,
        })
        .await
        .expect("Failed to create test user");

    CurrentUser::from(user)
}

/// Log in through the API and return the bearer token.
pub async fn login_token(server: &TestServer, email: &str) -> String {
    let response = server
        .post("/api/login")
        .json(&serde_json::json!({"email": email, "password": TEST_PASSWORD}))
        .await;
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    body["token"].as_str().expect("Login response carried no token").to_string()
}

/// Attach a bearer token to a request.
pub fn authed(request: TestRequest, token: &str) -> TestRequest {
    request.add_header("authorization", format!("Bearer {token}"))
}
