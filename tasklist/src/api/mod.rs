//! API layer for HTTP request handling and data models.
//!
//! This module contains the REST API implementation, organized into:
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! The API is divided into three functional areas:
//!
//! - **Authentication** (`/api/register`, `/api/login`): account creation and token issuance
//! - **Todos** (`/api/todos/*`): per-user todo CRUD, token required
//! - **Admin** (`/api/admin/*`): user management and statistics, admin token required
//!
//! # OpenAPI Documentation
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`.
//! API documentation is served at `/docs` when the server is running.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

pub mod handlers;
pub mod models;

/// Registers the bearer token security scheme referenced by protected paths.
struct BearerTokenAddon;

impl Modify for BearerTokenAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_token".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Token from `POST /api/login`. Include it in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerTokenAddon),
    paths(
        handlers::auth::register,
        handlers::auth::login,
        handlers::todos::list_todos,
        handlers::todos::create_todo,
        handlers::todos::update_todo,
        handlers::todos::delete_todo,
        handlers::admin::list_users,
        handlers::admin::delete_user,
        handlers::admin::make_admin,
        handlers::admin::stats,
        handlers::admin::list_all_todos,
    ),
    components(
        schemas(
            models::MessageResponse,
            models::users::RegisterRequest,
            models::users::LoginRequest,
            models::users::LoginResponse,
            models::users::CurrentUser,
            models::users::UserResponse,
            models::todos::TodoCreateRequest,
            models::todos::TodoUpdateRequest,
            models::todos::TodoResponse,
            models::todos::TodoListResponse,
            models::admin::AdminUserResponse,
            models::admin::AdminUserListResponse,
            models::admin::AdminTodoResponse,
            models::admin::AdminTodoListResponse,
            models::admin::StatsResponse,
        )
    ),
    tags(
        (name = "authentication", description = "Account creation and login"),
        (name = "todos", description = "Per-user todo management"),
        (name = "admin", description = "Administration endpoints"),
    )
)]
pub struct ApiDoc;
