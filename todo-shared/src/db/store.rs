/// Storage abstraction used by the request handlers
///
/// A [`Store`] hands out [`Session`]s. A session is one unit of work: its
/// writes become visible only after [`Session::commit`], and dropping a
/// session without committing discards them. Handlers only ever see
/// `Box<dyn Session>`, so the backing engine can be swapped without touching
/// them.
///
/// Implementations:
///
/// - [`crate::db::postgres::PgStore`]: one transaction per session
/// - [`crate::db::memory::MemoryStore`]: in-process, sessions serialized
///
/// # Example
///
/// ```
/// use todo_shared::db::memory::MemoryStore;
/// use todo_shared::db::store::{Session, Store};
/// use todo_shared::models::NewUser;
///
/// # async fn example() -> Result<(), todo_shared::db::store::StoreError> {
/// let store = MemoryStore::new();
///
/// let mut session = store.begin().await?;
/// let user = session
///     .create_user(NewUser {
///         username: "alice".to_string(),
///         email: "alice@example.com".to_string(),
///         first_name: "Alice".to_string(),
///         last_name: "Liddell".to_string(),
///         hashed_password: "$argon2id$...".to_string(),
///         role: "user".to_string(),
///     })
///     .await?;
/// session.commit().await?;
///
/// let mut session = store.begin().await?;
/// assert!(session.user_by_id(user.id).await?.is_some());
/// # Ok(())
/// # }
/// ```

use async_trait::async_trait;

use crate::models::{NewTodo, NewUser, Todo, User};

/// Storage result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by the storage layer
///
/// These are never translated into domain errors; callers surface them as
/// opaque server errors.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Error reported by the database driver
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    /// Unique, foreign key or check constraint violated
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Session used after it was committed
    #[error("Session already closed")]
    SessionClosed,
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation()
                || db_err.is_foreign_key_violation()
                || db_err.is_check_violation()
            {
                let constraint = db_err.constraint().unwrap_or("unknown");
                return StoreError::ConstraintViolation(constraint.to_string());
            }
        }
        StoreError::Database(err)
    }
}

/// Factory for request-scoped sessions
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Opens a new session
    async fn begin(&self) -> StoreResult<Box<dyn Session>>;

    /// Checks that the backing engine is reachable
    async fn ping(&self) -> StoreResult<()>;
}

/// One unit of work against the store
///
/// Todo operations take the caller's id and never match rows owned by
/// someone else.
#[async_trait]
pub trait Session: Send {
    async fn user_by_id(&mut self, id: i64) -> StoreResult<Option<User>>;

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>>;

    async fn user_by_email(&mut self, email: &str) -> StoreResult<Option<User>>;

    /// Inserts an active user
    async fn create_user(&mut self, data: NewUser) -> StoreResult<User>;

    /// Returns false if the user does not exist
    async fn update_password(&mut self, user_id: i64, hashed_password: &str) -> StoreResult<bool>;

    /// Returns false if the user does not exist
    async fn update_phone_number(&mut self, user_id: i64, phone_number: &str)
        -> StoreResult<bool>;

    async fn todos_for_owner(&mut self, owner_id: i64) -> StoreResult<Vec<Todo>>;

    async fn todo_for_owner(&mut self, todo_id: i64, owner_id: i64) -> StoreResult<Option<Todo>>;

    async fn create_todo(&mut self, data: NewTodo) -> StoreResult<Todo>;

    /// Writes back an owned todo; returns false if nothing matched
    async fn save_todo(&mut self, todo: &Todo) -> StoreResult<bool>;

    /// Returns false if nothing matched
    async fn delete_todo(&mut self, todo_id: i64, owner_id: i64) -> StoreResult<bool>;

    /// Makes this session's writes durable and closes it
    async fn commit(&mut self) -> StoreResult<()>;
}
