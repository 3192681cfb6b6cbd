use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::models::{
        MessageResponse,
        admin::{AdminTodoListResponse, AdminTodoResponse, AdminUserListResponse, AdminUserResponse, StatsResponse},
        users::{CurrentUser, UserResponse},
    },
    auth::current_user::require_admin,
    db::{
        handlers::{Repository, Todos, Users},
        models::users::UserUpdateDBRequest,
    },
    errors::Error,
    types::UserId,
};

/// List every user together with their todo statistics
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = "admin",
    responses(
        (status = 200, description = "All users with todo counts", body = AdminUserListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn list_users(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<AdminUserListResponse>, Error> {
    require_admin(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let users = Users::new(&mut conn).list_with_todo_counts().await?;

    Ok(Json(AdminUserListResponse {
        users: users.into_iter().map(AdminUserResponse::from).collect(),
    }))
}

/// Delete a user and everything they own
#[utoipa::path(
    delete,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    tag = "admin",
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 400, description = "Target is the caller"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, target_id = user_id))]
pub async fn delete_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<MessageResponse>, Error> {
    require_admin(&current_user)?;

    // An admin locking themselves out is never what they meant
    if user_id == current_user.id {
        return Err(Error::BadRequest {
            message: "Cannot delete yourself".to_string(),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let user = repo.get_by_id(user_id).await?.ok_or_else(|| Error::NotFound {
        resource: "user".to_string(),
        id: user_id.to_string(),
    })?;

    // Their todos go with them via the ON DELETE CASCADE
    repo.delete(user_id).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(MessageResponse::new(format!("User {} deleted", user.username))))
}

/// Grant a user the admin role
#[utoipa::path(
    put,
    path = "/api/admin/users/{id}/make-admin",
    params(("id" = i64, Path, description = "User ID")),
    tag = "admin",
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
        (status = 404, description = "No such user"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, target_id = user_id))]
pub async fn make_admin(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    require_admin(&current_user)?;

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut tx);

    let user = repo
        .update(
            user_id,
            &UserUpdateDBRequest {
                is_admin: Some(true),
                ..Default::default()
            },
        )
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(UserResponse::from(user)))
}

/// Aggregate counts over users and todos
#[utoipa::path(
    get,
    path = "/api/admin/stats",
    tag = "admin",
    responses(
        (status = 200, description = "Instance-wide statistics", body = StatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn stats(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<StatsResponse>, Error> {
    require_admin(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let total_users = Users::new(&mut conn).count().await?;
    let tally = Todos::new(&mut conn).tally().await?;

    Ok(Json(StatsResponse {
        total_users,
        total_todos: tally.total,
        completed_todos: tally.completed,
        pending_todos: tally.total - tally.completed,
    }))
}

/// List every todo in the system with its owner's username
#[utoipa::path(
    get,
    path = "/api/admin/todos",
    tag = "admin",
    responses(
        (status = 200, description = "All todos across all users", body = AdminTodoListResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller is not an admin"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn list_all_todos(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<AdminTodoListResponse>, Error> {
    require_admin(&current_user)?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let todos = Todos::new(&mut conn).list_with_owners().await?;

    Ok(Json(AdminTodoListResponse {
        todos: todos.into_iter().map(AdminTodoResponse::from).collect(),
    }))
}
