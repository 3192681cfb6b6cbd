//! API response models for the admin surface.

use crate::db::models::todos::TodoWithOwner;
use crate::db::models::users::UserWithTodoCounts;
use crate::types::{TodoId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user as seen in the admin listing, with todo totals
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
    pub todo_count: i64,
    pub completed_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminUserListResponse {
    pub users: Vec<AdminUserResponse>,
}

/// A todo as seen in the admin listing, with its owner's username
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminTodoResponse {
    pub id: TodoId,
    pub user_id: UserId,
    pub username: String,
    pub task_content: String,
    pub is_completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdminTodoListResponse {
    pub todos: Vec<AdminTodoResponse>,
}

/// Service-wide todo statistics
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_todos: i64,
    pub completed_todos: i64,
    pub pending_todos: i64,
}

impl From<UserWithTodoCounts> for AdminUserResponse {
    fn from(db: UserWithTodoCounts) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
            is_admin: db.is_admin,
            created_at: db.created_at,
            todo_count: db.todo_count,
            completed_count: db.completed_count,
        }
    }
}

impl From<TodoWithOwner> for AdminTodoResponse {
    fn from(db: TodoWithOwner) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            username: db.username,
            task_content: db.task_content,
            is_completed: db.is_completed,
            created_at: db.created_at,
        }
    }
}
