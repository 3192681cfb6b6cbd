//! Database repository for users.

use crate::types::UserId;
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::users::{UserCreateDBRequest, UserDBResponse, UserUpdateDBRequest, UserWithTodoCounts},
};
use sqlx::SqliteConnection;
use tracing::instrument;

/// Filter for listing users. There are no filterable columns yet; listings
/// always return every user in insertion order.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {}

pub struct Users<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Users<'c> {
    type CreateRequest = UserCreateDBRequest;
    type UpdateRequest = UserUpdateDBRequest;
    type Response = UserDBResponse;
    type Id = UserId;
    type Filter = UserFilter;

    #[instrument(skip(self, request), fields(username = %request.username), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            INSERT INTO users (username, email, password_hash, is_admin)
            VALUES (?1, ?2, ?3, ?4)
            RETURNING *
            "#,
        )
        .bind(&request.username)
        .bind(&request.email)
        .bind(&request.password_hash)
        .bind(request.is_admin)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, _filter), err)]
    async fn list(&mut self, _filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let users = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users ORDER BY id ASC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(users)
    }

    #[instrument(skip(self), fields(user_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        // Todos are removed by the ON DELETE CASCADE on todos.user_id
        let result = sqlx::query("DELETE FROM users WHERE id = ?1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(user_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let user = sqlx::query_as::<_, UserDBResponse>(
            r#"
            UPDATE users SET
                is_admin = COALESCE(?2, is_admin),
                password_hash = COALESCE(?3, password_hash)
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(request.is_admin)
        .bind(&request.password_hash)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(user)
    }
}

impl<'c> Users<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, email), err)]
    pub async fn get_user_by_email(&mut self, email: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE email = ?1")
            .bind(email)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self, username), err)]
    pub async fn get_user_by_username(&mut self, username: &str) -> Result<Option<UserDBResponse>> {
        let user = sqlx::query_as::<_, UserDBResponse>("SELECT * FROM users WHERE username = ?1")
            .bind(username)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(user)
    }

    #[instrument(skip(self), err)]
    pub async fn count(&mut self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(&mut *self.db).await?;

        Ok(count)
    }

    /// List every user together with todo totals, for the admin user listing.
    #[instrument(skip(self), err)]
    pub async fn list_with_todo_counts(&mut self) -> Result<Vec<UserWithTodoCounts>> {
        let users = sqlx::query_as::<_, UserWithTodoCounts>(
            r#"
            SELECT
                u.id, u.username, u.email, u.is_admin, u.created_at,
                COUNT(t.id) AS todo_count,
                COALESCE(SUM(t.is_completed), 0) AS completed_count
            FROM users u
            LEFT JOIN todos t ON t.user_id = u.id
            GROUP BY u.id
            ORDER BY u.id ASC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users)
    }
}
