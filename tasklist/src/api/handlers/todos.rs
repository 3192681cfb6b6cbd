use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        MessageResponse,
        todos::{TodoCreateRequest, TodoListResponse, TodoResponse, TodoUpdateRequest},
        users::CurrentUser,
    },
    db::{
        handlers::{Repository, Todos, todos::TodoFilter},
        models::todos::{TodoCreateDBRequest, TodoDBResponse, TodoUpdateDBRequest},
    },
    errors::Error,
    types::TodoId,
};

/// Look up a todo and check the caller owns it.
///
/// Missing todos answer 404 before any ownership question; a todo owned by
/// someone else answers 403 regardless of what the caller wanted to do with
/// it. The access gate only proves who the caller is, this proves they may
/// touch this row.
async fn get_owned_todo(repo: &mut Todos<'_>, todo_id: TodoId, current_user: &CurrentUser) -> Result<TodoDBResponse, Error> {
    let todo = repo.get_by_id(todo_id).await?.ok_or_else(|| Error::NotFound {
        resource: "todo".to_string(),
        id: todo_id.to_string(),
    })?;

    if todo.user_id != current_user.id {
        return Err(Error::InsufficientPermissions {
            message: Some("Not authorized".to_string()),
        });
    }

    Ok(todo)
}

/// List the caller's todos
#[utoipa::path(
    get,
    path = "/api/todos",
    tag = "todos",
    responses(
        (status = 200, description = "The caller's todos", body = TodoListResponse),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn list_todos(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<TodoListResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Todos::new(&mut conn);

    let todos = repo.list(&TodoFilter::for_user(current_user.id)).await?;

    Ok(Json(TodoListResponse {
        todos: todos.into_iter().map(TodoResponse::from).collect(),
    }))
}

/// Create a todo owned by the caller
#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = TodoCreateRequest,
    tag = "todos",
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Missing or blank task content"),
        (status = 401, description = "Not authenticated"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id))]
pub async fn create_todo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<TodoCreateRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), Error> {
    // Absent and blank are the same failure
    let task_content = match request.task_content {
        Some(content) if !content.is_empty() => content,
        _ => {
            return Err(Error::BadRequest {
                message: "task_content required".to_string(),
            });
        }
    };

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Todos::new(&mut tx);

    // The owner is always the caller, never taken from the request body
    let todo = repo
        .create(&TodoCreateDBRequest {
            user_id: current_user.id,
            task_content,
        })
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

/// Update a todo the caller owns
#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    request_body = TodoUpdateRequest,
    params(("id" = i64, Path, description = "Todo ID")),
    tag = "todos",
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own this todo"),
        (status = 404, description = "No such todo"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, todo_id))]
pub async fn update_todo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(todo_id): Path<TodoId>,
    Json(request): Json<TodoUpdateRequest>,
) -> Result<Json<TodoResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Todos::new(&mut tx);

    get_owned_todo(&mut repo, todo_id, &current_user).await?;

    let todo = repo
        .update(
            todo_id,
            &TodoUpdateDBRequest {
                task_content: request.task_content,
                is_completed: request.is_completed,
            },
        )
        .await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(TodoResponse::from(todo)))
}

/// Delete a todo the caller owns
#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(("id" = i64, Path, description = "Todo ID")),
    tag = "todos",
    responses(
        (status = 200, description = "Todo deleted", body = MessageResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Caller does not own this todo"),
        (status = 404, description = "No such todo"),
    ),
    security(("bearer_token" = []))
)]
#[tracing::instrument(skip_all, fields(user_id = current_user.id, todo_id))]
pub async fn delete_todo(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(todo_id): Path<TodoId>,
) -> Result<Json<MessageResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Todos::new(&mut tx);

    get_owned_todo(&mut repo, todo_id, &current_user).await?;
    repo.delete(todo_id).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(MessageResponse::new("Todo deleted")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{authed, create_test_app, create_test_user, login_token};
    use serde_json::{Value, json};

    #[tokio::test]
    async fn test_list_starts_empty() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        let token = login_token(&server, "alice@example.com").await;

        let response = authed(server.get("/api/todos"), &token).await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["todos"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let (state, server) = create_test_app().await;
        let user = create_test_user(&state, "alice", false).await;
        let token = login_token(&server, "alice@example.com").await;

        let response = authed(server.post("/api/todos"), &token)
            .json(&json!({"task_content": "buy milk"}))
            .await;

        response.assert_status(StatusCode::CREATED);
        let created: Value = response.json();
        assert_eq!(created["task_content"], "buy milk");
        assert_eq!(created["is_completed"], false);
        assert_eq!(created["user_id"], user.id);

        let listed: Value = authed(server.get("/api/todos"), &token).await.json();
        let todos = listed["todos"].as_array().unwrap();
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0]["id"], created["id"]);
    }

    #[tokio::test]
    async fn test_create_requires_task_content() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        let token = login_token(&server, "alice@example.com").await;

        for body in [json!({}), json!({"task_content": ""}), json!({"task_content": null})] {
            let response = authed(server.post("/api/todos"), &token).json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let error: Value = response.json();
            assert_eq!(error["error"], "task_content required", "body: {body}");
        }
    }

    #[tokio::test]
    async fn test_list_only_shows_own_todos() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        create_test_user(&state, "bob", false).await;
        let alice_token = login_token(&server, "alice@example.com").await;
        let bob_token = login_token(&server, "bob@example.com").await;

        authed(server.post("/api/todos"), &alice_token)
            .json(&json!({"task_content": "alice's task"}))
            .await
            .assert_status(StatusCode::CREATED);

        let bobs: Value = authed(server.get("/api/todos"), &bob_token).await.json();
        assert_eq!(bobs["todos"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_update_own_todo() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        let token = login_token(&server, "alice@example.com").await;

        let created: Value = authed(server.post("/api/todos"), &token)
            .json(&json!({"task_content": "original"}))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = authed(server.put(&format!("/api/todos/{id}")), &token)
            .json(&json!({"is_completed": true}))
            .await;

        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["is_completed"], true);
        // Fields absent from the request are untouched
        assert_eq!(updated["task_content"], "original");
    }

    #[tokio::test]
    async fn test_update_someone_elses_todo_forbidden() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        create_test_user(&state, "bob", false).await;
        let alice_token = login_token(&server, "alice@example.com").await;
        let bob_token = login_token(&server, "bob@example.com").await;

        let created: Value = authed(server.post("/api/todos"), &alice_token)
            .json(&json!({"task_content": "alice's secret"}))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = authed(server.put(&format!("/api/todos/{id}")), &bob_token)
            .json(&json!({"task_content": "hijacked"}))
            .await;

        response.assert_status(StatusCode::FORBIDDEN);
        let error: Value = response.json();
        assert_eq!(error["error"], "Not authorized");

        // The row is unchanged; the owner still sees the original content
        let listed: Value = authed(server.get("/api/todos"), &alice_token).await.json();
        assert_eq!(listed["todos"][0]["task_content"], "alice's secret");
    }

    #[tokio::test]
    async fn test_update_missing_todo_not_found() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        let token = login_token(&server, "alice@example.com").await;

        let response = authed(server.put("/api/todos/999"), &token)
            .json(&json!({"is_completed": true}))
            .await;

        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_own_todo() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        let token = login_token(&server, "alice@example.com").await;

        let created: Value = authed(server.post("/api/todos"), &token)
            .json(&json!({"task_content": "ephemeral"}))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = authed(server.delete(&format!("/api/todos/{id}")), &token).await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["message"], "Todo deleted");

        let listed: Value = authed(server.get("/api/todos"), &token).await.json();
        assert_eq!(listed["todos"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_delete_someone_elses_todo_forbidden() {
        let (state, server) = create_test_app().await;
        create_test_user(&state, "alice", false).await;
        create_test_user(&state, "mallory", false).await;
        let alice_token = login_token(&server, "alice@example.com").await;
        let mallory_token = login_token(&server, "mallory@example.com").await;

        let created: Value = authed(server.post("/api/todos"), &alice_token)
            .json(&json!({"task_content": "keep out"}))
            .await
            .json();
        let id = created["id"].as_i64().unwrap();

        let response = authed(server.delete(&format!("/api/todos/{id}")), &mallory_token).await;
        response.assert_status(StatusCode::FORBIDDEN);

        // Still there
        let listed: Value = authed(server.get("/api/todos"), &alice_token).await.json();
        assert_eq!(listed["todos"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_unauthenticated_requests_rejected() {
        let (_state, server) = create_test_app().await;

        server.get("/api/todos").await.assert_status(StatusCode::UNAUTHORIZED);
        server
            .post("/api/todos")
            .json(&json!({"task_content": "nope"}))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
        server.put("/api/todos/1").json(&json!({})).await.assert_status(StatusCode::UNAUTHORIZED);
        server.delete("/api/todos/1").await.assert_status(StatusCode::UNAUTHORIZED);
    }
}
