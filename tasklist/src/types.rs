//! Common type definitions.
//!
//! Entity identifiers are store-assigned SQLite rowids, wrapped in type
//! aliases so signatures say which entity they refer to:
//!
//! - [`UserId`]: user account identifier
//! - [`TodoId`]: todo item identifier

/// User account identifier.
pub type UserId = i64;

/// Todo item identifier.
pub type TodoId = i64;
