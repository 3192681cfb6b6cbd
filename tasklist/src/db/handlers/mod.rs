//! Repository implementations for database access.
//!
//! This module provides repository structs for each major entity in the system.
//! Repositories follow a consistent pattern and implement the [`Repository`] trait.
//!
//! # Design Pattern
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: User account management and authentication
//! - [`Todos`]: Per-user todo items and admin-wide listings
//!
//! # Common Pattern
//!
//! All repositories follow this usage pattern:
//!
//! ```ignore
//! use tasklist::db::handlers::{Repository, Todos};
//! use tasklist::db::handlers::todos::TodoFilter;
//!
//! async fn example(pool: &sqlx::SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
//!     // Start a transaction
//!     let mut tx = pool.begin().await?;
//!
//!     // Create repository from transaction
//!     let mut repo = Todos::new(&mut tx);
//!
//!     // Perform operations
//!     let todos = repo.list(&TodoFilter::default()).await?;
//!
//!     // Commit or rollback
//!     tx.commit().await?;
//!     Ok(())
//! }
//! ```

pub mod repository;
pub mod todos;
pub mod users;

pub use repository::Repository;
pub use todos::Todos;
pub use users::Users;
