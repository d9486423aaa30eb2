/// Todo model and its SQL
///
/// Every query here is scoped by `owner_id`; no query loads a todo by id alone.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE todos (
///     id BIGSERIAL PRIMARY KEY,
///     title VARCHAR(255) NOT NULL,
///     description VARCHAR(255) NOT NULL,
///     priority INTEGER NOT NULL CHECK (priority BETWEEN 1 AND 5),
///     complete BOOLEAN NOT NULL DEFAULT FALSE,
///     owner_id BIGINT NOT NULL REFERENCES users(id) ON DELETE CASCADE
/// );
/// ```

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

const TODO_COLUMNS: &str = "id, title, description, priority, complete, owner_id";

/// A todo item owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub complete: bool,

    /// ID of the owning user
    pub owner_id: i64,
}

/// Input for creating a todo
#[derive(Debug, Clone)]
pub struct NewTodo {
    pub title: String,
    pub description: String,
    pub priority: i32,
    pub complete: bool,
    pub owner_id: i64,
}

impl Todo {
    /// Flips the completion flag
    pub fn toggle_complete(&mut self) {
        self.complete = !self.complete;
    }

    /// Inserts a todo
    ///
    /// # Errors
    ///
    /// Fails with a foreign key violation if `owner_id` does not exist.
    pub async fn create(conn: &mut PgConnection, data: NewTodo) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO todos (title, description, priority, complete, owner_id) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {TODO_COLUMNS}"
        );

        sqlx::query_as::<_, Todo>(&query)
            .bind(data.title)
            .bind(data.description)
            .bind(data.priority)
            .bind(data.complete)
            .bind(data.owner_id)
            .fetch_one(conn)
            .await
    }

    /// Lists a user's todos, oldest first
    pub async fn list_by_owner(
        conn: &mut PgConnection,
        owner_id: i64,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let query = format!("SELECT {TODO_COLUMNS} FROM todos WHERE owner_id = $1 ORDER BY id");

        sqlx::query_as::<_, Todo>(&query)
            .bind(owner_id)
            .fetch_all(conn)
            .await
    }

    /// Finds one todo, only if `owner_id` owns it
    pub async fn find_owned(
        conn: &mut PgConnection,
        id: i64,
        owner_id: i64,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND owner_id = $2");

        sqlx::query_as::<_, Todo>(&query)
            .bind(id)
            .bind(owner_id)
            .fetch_optional(conn)
            .await
    }

    /// Writes back title, description, priority and completion
    ///
    /// The row is matched on both id and owner, so a todo whose `owner_id`
    /// was altered in memory is never written. Returns false if nothing
    /// matched.
    pub async fn save(&self, conn: &mut PgConnection) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE todos
            SET title = $3, description = $4, priority = $5, complete = $6
            WHERE id = $1 AND owner_id = $2
            "#,
        )
        .bind(self.id)
        .bind(self.owner_id)
        .bind(&self.title)
        .bind(&self.description)
        .bind(self.priority)
        .bind(self.complete)
        .execute(conn)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Deletes one todo if `owner_id` owns it
    ///
    /// Returns false if nothing matched.
    pub async fn delete_owned(
        conn: &mut PgConnection,
        id: i64,
        owner_id: i64,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
