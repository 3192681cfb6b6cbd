//! Database repository for todos.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::todos::{TodoCreateDBRequest, TodoDBResponse, TodoTally, TodoUpdateDBRequest, TodoWithOwner},
};
use crate::types::{TodoId, UserId};
use sqlx::SqliteConnection;
use tracing::instrument;

/// Filter for listing todos
#[derive(Debug, Clone, Default)]
pub struct TodoFilter {
    pub user_id: Option<UserId>,
}

impl TodoFilter {
    pub fn for_user(user_id: UserId) -> Self {
        Self { user_id: Some(user_id) }
    }
}

pub struct Todos<'c> {
    db: &'c mut SqliteConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Todos<'c> {
    type CreateRequest = TodoCreateDBRequest;
    type UpdateRequest = TodoUpdateDBRequest;
    type Response = TodoDBResponse;
    type Id = TodoId;
    type Filter = TodoFilter;

    #[instrument(skip(self, request), fields(user_id = request.user_id), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let todo = sqlx::query_as::<_, TodoDBResponse>(
            r#"
            INSERT INTO todos (user_id, task_content)
            VALUES (?1, ?2)
            RETURNING *
            "#,
        )
        .bind(request.user_id)
        .bind(&request.task_content)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(todo)
    }

    #[instrument(skip(self), fields(todo_id = id), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let todo = sqlx::query_as::<_, TodoDBResponse>("SELECT * FROM todos WHERE id = ?1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(todo)
    }

    #[instrument(skip(self, filter), fields(user_id = filter.user_id), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let todos = if let Some(user_id) = filter.user_id {
            sqlx::query_as::<_, TodoDBResponse>("SELECT * FROM todos WHERE user_id = ?1 ORDER BY id ASC")
                .bind(user_id)
                .fetch_all(&mut *self.db)
                .await?
        } else {
            sqlx::query_as::<_, TodoDBResponse>("SELECT * FROM todos ORDER BY id ASC")
                .fetch_all(&mut *self.db)
                .await?
        };

        Ok(todos)
    }

    #[instrument(skip(self), fields(todo_id = id), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(todo_id = id), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let todo = sqlx::query_as::<_, TodoDBResponse>(
            r#"
            UPDATE todos SET
                task_content = COALESCE(?2, task_content),
                is_completed = COALESCE(?3, is_completed)
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.task_content)
        .bind(request.is_completed)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(todo)
    }
}

impl<'c> Todos<'c> {
    pub fn new(db: &'c mut SqliteConnection) -> Self {
        Self { db }
    }

    /// List every todo joined with its owner's username, for the admin todo listing.
    #[instrument(skip(self), err)]
    pub async fn list_with_owners(&mut self) -> Result<Vec<TodoWithOwner>> {
        let todos = sqlx::query_as::<_, TodoWithOwner>(
            r#"
            SELECT t.id, t.user_id, u.username, t.task_content, t.is_completed, t.created_at
            FROM todos t
            JOIN users u ON u.id = t.user_id
            ORDER BY t.id ASC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(todos)
    }

    /// Total and completed todo counts across all users.
    #[instrument(skip(self), err)]
    pub async fn tally(&mut self) -> Result<TodoTally> {
        let tally = sqlx::query_as::<_, TodoTally>(
            "SELECT COUNT(*) AS total, COALESCE(SUM(is_completed), 0) AS completed FROM todos",
        )
        .fetch_one(&mut *self.db)
        .await?;

        Ok(tally)
    }
}

#[cfg(test)]
mod tests {
    use super::super::repository::Repository;
    use super::*;
    use crate::db::handlers::users::Users;
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::SqlitePool;

    async fn seed_user(conn: &mut SqliteConnection, username: &str) -> UserId {
        let mut repo = Users::new(conn);
        let user = repo
            .create(&UserCreateDBRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "$argon2id$fake".to_string(),
                is_admin: false,
            })
            .await
            .unwrap();
        user.id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_todo(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let user_id = seed_user(&mut conn, "owner").await;

        let mut repo = Todos::new(&mut conn);
        let todo = repo
            .create(&TodoCreateDBRequest { user_id, task_content: "buy milk".to_string() })
            .await
            .unwrap();

        assert_eq!(todo.user_id, user_id);
        assert_eq!(todo.task_content, "buy milk");
        assert!(!todo.is_completed);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_create_todo_for_missing_user_fails(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Todos::new(&mut conn);

        let err = repo
            .create(&TodoCreateDBRequest { user_id: 999, task_content: "orphan".to_string() })
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_is_scoped_to_the_filtered_user(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let alice = seed_user(&mut conn, "alice").await;
        let bob = seed_user(&mut conn, "bob").await;

        let mut repo = Todos::new(&mut conn);
        repo.create(&TodoCreateDBRequest { user_id: alice, task_content: "a1".to_string() }).await.unwrap();
        repo.create(&TodoCreateDBRequest { user_id: bob, task_content: "b1".to_string() }).await.unwrap();
        repo.create(&TodoCreateDBRequest { user_id: alice, task_content: "a2".to_string() }).await.unwrap();

        let listed = repo.list(&TodoFilter::for_user(alice)).await.unwrap();
        assert_eq!(listed.len(), 2);
        // Insertion order within the owner's list
        assert_eq!(listed[0].task_content, "a1");
        assert_eq!(listed[1].task_content, "a2");

        let all = repo.list(&TodoFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_preserves_unset_fields(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let user_id = seed_user(&mut conn, "owner").await;

        let mut repo = Todos::new(&mut conn);
        let todo = repo
            .create(&TodoCreateDBRequest { user_id, task_content: "original".to_string() })
            .await
            .unwrap();

        let updated = repo
            .update(todo.id, &TodoUpdateDBRequest { is_completed: Some(true), ..Default::default() })
            .await
            .unwrap();
        assert!(updated.is_completed);
        assert_eq!(updated.task_content, "original");

        let updated = repo
            .update(todo.id, &TodoUpdateDBRequest { task_content: Some("renamed".to_string()), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(updated.task_content, "renamed");
        assert!(updated.is_completed);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_update_missing_todo_is_not_found(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut repo = Todos::new(&mut conn);

        let err = repo
            .update(999, &TodoUpdateDBRequest { is_completed: Some(true), ..Default::default() })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_delete_todo(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let user_id = seed_user(&mut conn, "owner").await;

        let mut repo = Todos::new(&mut conn);
        let todo = repo.create(&TodoCreateDBRequest { user_id, task_content: "gone".to_string() }).await.unwrap();

        assert!(repo.delete(todo.id).await.unwrap());
        assert!(!repo.delete(todo.id).await.unwrap());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_deleting_user_cascades_to_todos(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let user_id = seed_user(&mut conn, "owner").await;

        {
            let mut repo = Todos::new(&mut conn);
            repo.create(&TodoCreateDBRequest { user_id, task_content: "doomed".to_string() }).await.unwrap();
        }

        let mut users = Users::new(&mut conn);
        assert!(users.delete(user_id).await.unwrap());

        let mut repo = Todos::new(&mut conn);
        let remaining = repo.list(&TodoFilter::default()).await.unwrap();
        assert!(remaining.is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_with_owners_and_tally(pool: SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let alice = seed_user(&mut conn, "alice").await;
        let bob = seed_user(&mut conn, "bob").await;

        let mut repo = Todos::new(&mut conn);
        let first = repo.create(&TodoCreateDBRequest { user_id: alice, task_content: "a1".to_string() }).await.unwrap();
        repo.create(&TodoCreateDBRequest { user_id: bob, task_content: "b1".to_string() }).await.unwrap();
        repo.update(first.id, &TodoUpdateDBRequest { is_completed: Some(true), ..Default::default() }).await.unwrap();

        let with_owners = repo.list_with_owners().await.unwrap();
        assert_eq!(with_owners.len(), 2);
        assert_eq!(with_owners[0].username, "alice");
        assert_eq!(with_owners[1].username, "bob");

        let tally = repo.tally().await.unwrap();
        assert_eq!(tally.total, 2);
        assert_eq!(tally.completed, 1);
    }
}
