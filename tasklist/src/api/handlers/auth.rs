use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        MessageResponse,
        users::{CurrentUser, LoginRequest, LoginResponse, RegisterRequest},
    },
    auth::{password, token},
    db::handlers::{Repository, Users},
    db::models::users::UserCreateDBRequest,
    errors::Error,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    tag = "authentication",
    responses(
        (status = 201, description = "User registered successfully", body = MessageResponse),
        (status = 400, description = "Invalid input or duplicate email/username"),
        (status = 403, description = "Registration is disabled"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), Error> {
    // Check if registration is allowed
    if !state.config.auth.allow_registration {
        return Err(Error::InsufficientPermissions {
            message: Some("Registration is disabled".to_string()),
        });
    }

    // Validate password length
    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut tx);

    // Duplicates get their own messages; the unique constraints remain the
    // backstop if two registrations race past these checks
    if user_repo.get_user_by_email(&request.email).await?.is_some() {
        return Err(Error::BadRequest {
            message: "Email already registered".to_string(),
        });
    }
    if user_repo.get_user_by_username(&request.username).await?.is_some() {
        return Err(Error::BadRequest {
            message: "Username already taken".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let params = password_config.argon2_params();
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string_with_params(&password, Some(params)))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let create_request = UserCreateDBRequest {
        username: request.username,
        email: request.email,
        password_hash,
        is_admin: false,
    };
    user_repo.create(&create_request).await?;

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok((StatusCode::CREATED, Json(MessageResponse::new("Registration successful"))))
}

/// Login with email and password, receiving a bearer token
#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    tag = "authentication",
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<LoginResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    // Unknown email and wrong password answer identically
    let user = user_repo
        .get_user_by_email(&request.email)
        .await?
        .ok_or_else(|| Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        })?;

    // Verify password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let hash = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &hash))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::Unauthenticated {
            message: Some("Invalid email or password".to_string()),
        });
    }

    let current_user = CurrentUser::from(user);
    let token = token::create_token(&current_user, &state.config)?;

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: current_user,
    }))
}
