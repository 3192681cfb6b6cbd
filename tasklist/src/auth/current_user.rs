//! Request authentication: the bearer-token extractor and the admin gate.

use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::token,
    db::{errors::DbError, handlers::{Repository, Users}},
    errors::{Error, Result},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{instrument, trace};

/// Extract the authenticated user from a `Authorization: Bearer <jwt>` header.
///
/// Checks run in a fixed order and the first failure wins:
/// 1. missing header
/// 2. header not shaped `Bearer <token>`
/// 3. token fails signature or expiry verification
/// 4. the token's subject no longer exists (deleted after issuance)
///
/// Steps 1 and 2 fail before any database access. Every failure maps to 401;
/// the body does not reveal which check rejected beyond its message.
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let Some(auth_header) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
            trace!("No authorization header on protected route");
            return Err(Error::Unauthenticated {
                message: Some("Token is missing".to_string()),
            });
        };

        let token_str = auth_header
            .to_str()
            .ok()
            .and_then(|s| s.strip_prefix("Bearer "))
            .ok_or_else(|| Error::Unauthenticated {
                message: Some("Invalid token format".to_string()),
            })?;

        let claims = token::verify_token(token_str, &state.config)?;

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
        let user = Users::new(&mut conn)
            .get_by_id(claims.user_id)
            .await?
            .ok_or_else(|| Error::Unauthenticated {
                message: Some("User not found".to_string()),
            })?;

        Ok(CurrentUser::from(user))
    }
}

/// Reject non-admin callers. Admin handlers call this before touching
/// anything, so a 403 means the handler body never ran.
pub fn require_admin(user: &CurrentUser) -> Result<()> {
    if user.is_admin {
        Ok(())
    } else {
        Err(Error::InsufficientPermissions {
            message: Some("Admin access required".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{api::models::users::CurrentUser, auth::token::create_token, test_utils::create_test_app};
    use axum::{extract::FromRequestParts as _, http::request::Parts};

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let builder = axum::http::Request::builder().uri("http://localhost/api/todos");
        let builder = match value {
            Some(v) => builder.header(axum::http::header::AUTHORIZATION, v),
            None => builder,
        };
        let (parts, _body) = builder.body(()).unwrap().into_parts();
        parts
    }

    #[tokio::test]
    async fn test_missing_header_rejected() {
        let (state, _server) = create_test_app().await;

        let mut parts = parts_with_auth(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.user_message(), "Token is missing");
    }

    #[tokio::test]
    async fn test_missing_header_never_touches_the_store() {
        let (state, _server) = create_test_app().await;
        // With the pool closed, any store access would surface as a database
        // error instead of the missing-token rejection
        state.db.close().await;

        let mut parts = parts_with_auth(None);
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.user_message(), "Token is missing");
    }

    #[tokio::test]
    async fn test_non_bearer_header_rejected() {
        let (state, _server) = create_test_app().await;

        for value in ["Basic dXNlcjpwYXNz", "bearer lowercase", "Bearer", "token-with-no-scheme"] {
            let mut parts = parts_with_auth(Some(value));
            let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();

            assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED, "value: {value}");
            assert_eq!(err.user_message(), "Invalid token format", "value: {value}");
        }
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let (state, _server) = create_test_app().await;

        let mut parts = parts_with_auth(Some("Bearer not.a.jwt"));
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.user_message(), "Token is invalid or expired");
    }

    #[tokio::test]
    async fn test_valid_token_resolves_user() {
        let (state, _server) = create_test_app().await;
        let user = crate::test_utils::create_test_user(&state, "alice", false).await;

        let token = create_token(&user, &state.config).unwrap();
        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));

        let resolved = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(resolved.id, user.id);
        assert_eq!(resolved.username, "alice");
        assert!(!resolved.is_admin);
    }

    #[tokio::test]
    async fn test_token_for_deleted_user_rejected() {
        let (state, _server) = create_test_app().await;
        let user = crate::test_utils::create_test_user(&state, "ghost", false).await;
        let token = create_token(&user, &state.config).unwrap();

        {
            let mut conn = state.db.acquire().await.unwrap();
            assert!(Users::new(&mut conn).delete(user.id).await.unwrap());
        }

        let mut parts = parts_with_auth(Some(&format!("Bearer {token}")));
        let err = CurrentUser::from_request_parts(&mut parts, &state).await.unwrap_err();

        assert_eq!(err.status_code(), axum::http::StatusCode::UNAUTHORIZED);
        assert_eq!(err.user_message(), "User not found");
    }

    #[test]
    fn test_require_admin() {
        let admin = CurrentUser {
            id: 1,
            username: "admin".to_string(),
            email: "admin@example.com".to_string(),
            is_admin: true,
        };
        assert!(require_admin(&admin).is_ok());

        let regular = CurrentUser {
            id: 2,
            username: "user".to_string(),
            email: "user@example.com".to_string(),
            is_admin: false,
        };
        let err = require_admin(&regular).unwrap_err();
        assert_eq!(err.status_code(), axum::http::StatusCode::FORBIDDEN);
        assert_eq!(err.user_message(), "Admin access required");
    }
}
