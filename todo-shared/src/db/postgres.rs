/// PostgreSQL-backed store
///
/// Each session owns one transaction checked out of the pool. Committing
/// returns the connection; dropping an uncommitted session rolls the
/// transaction back and returns the connection as well, so every exit path of
/// a request releases its connection.

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::debug;

use super::store::{Session, Store, StoreError, StoreResult};
use crate::models::{NewTodo, NewUser, Todo, User};

/// Store over a PostgreSQL connection pool
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn Session>> {
        let tx = self.pool.begin().await?;
        debug!("Opened database session");
        Ok(Box::new(PgSession { tx: Some(tx) }))
    }

    async fn ping(&self) -> StoreResult<()> {
        super::pool::health_check(&self.pool).await?;
        Ok(())
    }
}

/// One transaction; `None` once committed
pub struct PgSession {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgSession {
    fn conn(&mut self) -> StoreResult<&mut PgConnection> {
        self.tx
            .as_deref_mut()
            .ok_or(StoreError::SessionClosed)
    }
}

#[async_trait]
impl Session for PgSession {
    async fn user_by_id(&mut self, id: i64) -> StoreResult<Option<User>> {
        Ok(User::find_by_id(self.conn()?, id).await?)
    }

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_username(self.conn()?, username).await?)
    }

    async fn user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        Ok(User::find_by_email(self.conn()?, email).await?)
    }

    async fn create_user(&mut self, data: NewUser) -> StoreResult<User> {
        Ok(User::create(self.conn()?, data).await?)
    }

    async fn update_password(&mut self, user_id: i64, hashed_password: &str) -> StoreResult<bool> {
        Ok(User::update_password(self.conn()?, user_id, hashed_password).await?)
    }

    async fn update_phone_number(
        &mut self,
        user_id: i64,
        phone_number: &str,
    ) -> StoreResult<bool> {
        Ok(User::update_phone_number(self.conn()?, user_id, phone_number).await?)
    }

    async fn todos_for_owner(&mut self, owner_id: i64) -> StoreResult<Vec<Todo>> {
        Ok(Todo::list_by_owner(self.conn()?, owner_id).await?)
    }

    async fn todo_for_owner(&mut self, todo_id: i64, owner_id: i64) -> StoreResult<Option<Todo>> {
        Ok(Todo::find_owned(self.conn()?, todo_id, owner_id).await?)
    }

    async fn create_todo(&mut self, data: NewTodo) -> StoreResult<Todo> {
        Ok(Todo::create(self.conn()?, data).await?)
    }

    async fn save_todo(&mut self, todo: &Todo) -> StoreResult<bool> {
        Ok(todo.save(self.conn()?).await?)
    }

    async fn delete_todo(&mut self, todo_id: i64, owner_id: i64) -> StoreResult<bool> {
        Ok(Todo::delete_owned(self.conn()?, todo_id, owner_id).await?)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        let tx = self.tx.take().ok_or(StoreError::SessionClosed)?;
        tx.commit().await?;
        debug!("Committed database session");
        Ok(())
    }
}
