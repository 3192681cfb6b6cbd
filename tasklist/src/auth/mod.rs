//! Authentication and authorization system.
//!
//! This module provides the whole auth core:
//! - Password hashing and verification using Argon2
//! - Signed bearer tokens (JWT, HS256) with absolute expiry
//! - Request gating via an axum extractor plus an admin check
//!
//! # How a request is authenticated
//!
//! Clients log in via `/api/login` with email/password and receive a token.
//! Every protected request carries it as `Authorization: Bearer <token>`.
//! The server keeps no session state: the token is re-verified and its
//! subject re-resolved from the database on every request, so deleting a
//! user invalidates their outstanding tokens at the next request.
//!
//! Tokens cannot be revoked before expiry; the TTL is the only bound.
//!
//! # Modules
//!
//! - [`current_user`]: extractor for the authenticated user plus [`current_user::require_admin`]
//! - [`password`]: password hashing and verification using Argon2
//! - [`token`]: bearer token issuance and verification
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use tasklist::api::models::users::CurrentUser;
//!
//! async fn protected_handler(current_user: CurrentUser) -> String {
//!     format!("Hello, {}!", current_user.username)
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod token;
