//! API request/response models for todos.

use crate::db::models::todos::TodoDBResponse;
use crate::types::{TodoId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Request body for creating a todo.
///
/// `task_content` is optional at the serde level so an absent field and a
/// blank one produce the same validation error instead of a deserialization
/// rejection.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoCreateRequest {
    pub task_content: Option<String>,
}

/// Request body for updating a todo; absent fields are left untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct TodoUpdateRequest {
    pub task_content: Option<String>,
    pub is_completed: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoResponse {
    pub id: TodoId,
    pub task_content: String,
    pub is_completed: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TodoListResponse {
    pub todos: Vec<TodoResponse>,
}

impl From<TodoDBResponse> for TodoResponse {
    fn from(db: TodoDBResponse) -> Self {
        Self {
            id: db.id,
            task_content: db.task_content,
            is_completed: db.is_completed,
            user_id: db.user_id,
            created_at: db.created_at,
        }
    }
}
