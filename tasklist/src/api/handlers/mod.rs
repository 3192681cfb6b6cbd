//! HTTP request handlers for all API endpoints.
//!
//! This module contains Axum route handlers organized by resource type.
//! Each handler is responsible for:
//! - Request validation and deserialization
//! - Authentication and authorization checks
//! - Business logic execution via database repositories
//! - Response serialization
//!
//! # Handler Modules
//!
//! - [`auth`]: registration and login
//! - [`todos`]: todo CRUD scoped to the authenticated user
//! - [`admin`]: user administration, cross-user listings, and statistics
//!
//! # Authentication
//!
//! Protected handlers take [`crate::api::models::users::CurrentUser`] as an
//! extractor argument; requests without a valid bearer token never reach the
//! handler body. Admin handlers additionally call
//! [`crate::auth::current_user::require_admin`] before doing anything else.
//!
//! # Error Handling
//!
//! Handlers return [`crate::errors::Error`] which automatically converts to
//! appropriate HTTP status codes and JSON error responses.

pub mod admin;
pub mod auth;
pub mod todos;
