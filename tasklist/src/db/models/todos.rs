//! Database models for todos.

use crate::types::{TodoId, UserId};
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database request for creating a new todo
#[derive(Debug, Clone)]
pub struct TodoCreateDBRequest {
    pub user_id: UserId,
    pub task_content: String,
}

/// Database request for updating a todo; `None` fields are left untouched
#[derive(Debug, Clone, Default)]
pub struct TodoUpdateDBRequest {
    pub task_content: Option<String>,
    pub is_completed: Option<bool>,
}

/// Database response for a todo
#[derive(Debug, Clone, FromRow)]
pub struct TodoDBResponse {
    pub id: TodoId,
    pub user_id: UserId,
    pub task_content: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// A todo row joined with its owner's username, for the admin listing
#[derive(Debug, Clone, FromRow)]
pub struct TodoWithOwner {
    pub id: TodoId,
    pub user_id: UserId,
    pub username: String,
    pub task_content: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

/// Aggregate todo counts across all users, for the admin stats endpoint
#[derive(Debug, Clone, Copy, FromRow)]
pub struct TodoTally {
    pub total: i64,
    pub completed: i64,
}
