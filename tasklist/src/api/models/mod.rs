//! API request and response data models.
//!
//! This module contains the data structures used for HTTP request deserialization
//! and response serialization. These models define the public API contract.
//!
//! # Design Principles
//!
//! - **Separation of Concerns**: API models are distinct from database models,
//!   allowing independent evolution of API and storage representations
//! - **Validation**: Models use serde for deserialization and validation
//! - **OpenAPI**: All models are annotated with `utoipa` for automatic API docs
//!
//! # Model Categories
//!
//! - [`users`]: registration/login payloads and user responses
//! - [`todos`]: todo creation/update payloads and responses
//! - [`admin`]: admin-only listings and service statistics

pub mod admin;
pub mod todos;
pub mod users;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Response carrying nothing but a human-readable confirmation
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}
