//! Database record models matching table schemas.
//!
//! These structs correspond directly to database table rows. Repositories
//! return them from queries and accept the `*DBRequest` variants for
//! insertion and update. They are distinct from the API models in
//! [`crate::api::models`] so the storage and API representations can evolve
//! independently; API models implement `From` conversions from these.

pub mod todos;
pub mod users;
