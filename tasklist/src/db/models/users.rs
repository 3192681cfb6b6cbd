//! Database models for users.

use crate::types::UserId;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub username: String,
    pub email: String,
    /// Always a hash, never the plaintext password
    pub password_hash: String,
    pub is_admin: bool,
}

/// Database request for updating a user; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct UserUpdateDBRequest {
    pub is_admin: Option<bool>,
    pub password_hash: Option<String>,
}

/// Database response for a user
#[derive(Debug, Clone, FromRow)]
pub struct UserDBResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A user row joined with todo counts, for the admin listing
#[derive(Debug, Clone, FromRow)]
pub struct UserWithTodoCounts {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub todo_count: i64,
    pub completed_count: i64,
}
