/// In-memory store
///
/// Holds users and todos in process memory and enforces the same constraints
/// as the SQL schema: unique username, email and phone number, and todo owners
/// must exist. Used by the API test-suite and handy for local experiments.
///
/// Sessions are serialized: `begin` waits for the single lock, and a session
/// that is dropped without committing restores the snapshot taken when it
/// started.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use super::store::{Session, Store, StoreError, StoreResult};
use crate::models::{NewTodo, NewUser, Todo, User};

#[derive(Debug, Clone, Default)]
struct Tables {
    users: Vec<User>,
    todos: Vec<Todo>,
    next_user_id: i64,
    next_todo_id: i64,
}

impl Tables {
    fn check_user_unique(&self, user: &User) -> StoreResult<()> {
        for other in self.users.iter().filter(|u| u.id != user.id) {
            if other.username == user.username {
                return Err(StoreError::ConstraintViolation(
                    "users_username_key".to_string(),
                ));
            }
            if other.email == user.email {
                return Err(StoreError::ConstraintViolation("users_email_key".to_string()));
            }
            if other.phone_number.is_some() && other.phone_number == user.phone_number {
                return Err(StoreError::ConstraintViolation(
                    "users_phone_number_key".to_string(),
                ));
            }
        }
        Ok(())
    }

    fn user_mut(&mut self, id: i64) -> Option<&mut User> {
        self.users.iter_mut().find(|u| u.id == id)
    }
}

/// Store kept entirely in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn Session>> {
        let guard = self.tables.clone().lock_owned().await;
        let snapshot = (*guard).clone();
        Ok(Box::new(MemorySession {
            tables: guard,
            snapshot: Some(snapshot),
        }))
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
}

/// Exclusive view of the tables for the lifetime of one session
pub struct MemorySession {
    tables: OwnedMutexGuard<Tables>,

    /// State at `begin`; `None` once committed
    snapshot: Option<Tables>,
}

impl MemorySession {
    fn tables(&mut self) -> StoreResult<&mut Tables> {
        if self.snapshot.is_none() {
            return Err(StoreError::SessionClosed);
        }
        Ok(&mut *self.tables)
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            *self.tables = snapshot;
        }
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn user_by_id(&mut self, id: i64) -> StoreResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_username(&mut self, username: &str) -> StoreResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn user_by_email(&mut self, email: &str) -> StoreResult<Option<User>> {
        let tables = self.tables()?;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(&mut self, data: NewUser) -> StoreResult<User> {
        let tables = self.tables()?;

        let user = User {
            id: tables.next_user_id + 1,
            username: data.username,
            email: data.email,
            first_name: data.first_name,
            last_name: data.last_name,
            hashed_password: data.hashed_password,
            is_active: true,
            role: data.role,
            phone_number: None,
        };
        tables.check_user_unique(&user)?;

        tables.next_user_id = user.id;
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_password(&mut self, user_id: i64, hashed_password: &str) -> StoreResult<bool> {
        let tables = self.tables()?;
        match tables.user_mut(user_id) {
            Some(user) => {
                user.hashed_password = hashed_password.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn update_phone_number(
        &mut self,
        user_id: i64,
        phone_number: &str,
    ) -> StoreResult<bool> {
        let tables = self.tables()?;
        let Some(user) = tables.users.iter().find(|u| u.id == user_id) else {
            return Ok(false);
        };

        let mut updated = user.clone();
        updated.phone_number = Some(phone_number.to_string());
        tables.check_user_unique(&updated)?;

        if let Some(user) = tables.user_mut(user_id) {
            *user = updated;
        }
        Ok(true)
    }

    async fn todos_for_owner(&mut self, owner_id: i64) -> StoreResult<Vec<Todo>> {
        let tables = self.tables()?;
        Ok(tables
            .todos
            .iter()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn todo_for_owner(&mut self, todo_id: i64, owner_id: i64) -> StoreResult<Option<Todo>> {
        let tables = self.tables()?;
        Ok(tables
            .todos
            .iter()
            .find(|t| t.id == todo_id && t.owner_id == owner_id)
            .cloned())
    }

    async fn create_todo(&mut self, data: NewTodo) -> StoreResult<Todo> {
        let tables = self.tables()?;

        if !tables.users.iter().any(|u| u.id == data.owner_id) {
            return Err(StoreError::ConstraintViolation(
                "todos_owner_id_fkey".to_string(),
            ));
        }

        let todo = Todo {
            id: tables.next_todo_id + 1,
            title: data.title,
            description: data.description,
            priority: data.priority,
            complete: data.complete,
            owner_id: data.owner_id,
        };

        tables.next_todo_id = todo.id;
        tables.todos.push(todo.clone());
        Ok(todo)
    }

    async fn save_todo(&mut self, todo: &Todo) -> StoreResult<bool> {
        let tables = self.tables()?;
        match tables
            .todos
            .iter_mut()
            .find(|t| t.id == todo.id && t.owner_id == todo.owner_id)
        {
            Some(stored) => {
                *stored = todo.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_todo(&mut self, todo_id: i64, owner_id: i64) -> StoreResult<bool> {
        let tables = self.tables()?;
        let before = tables.todos.len();
        tables
            .todos
            .retain(|t| !(t.id == todo_id && t.owner_id == owner_id));
        Ok(tables.todos.len() < before)
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.snapshot
            .take()
            .map(|_| ())
            .ok_or(StoreError::SessionClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(name: &str) -> NewUser {
        NewUser {
            username: name.to_string(),
            email: format!("{}@example.com", name),
            first_name: name.to_string(),
            last_name: "Tester".to_string(),
            hashed_password: "hash".to_string(),
            role: "user".to_string(),
        }
    }

    fn new_todo(title: &str, owner_id: i64) -> NewTodo {
        NewTodo {
            title: title.to_string(),
            description: "something to do".to_string(),
            priority: 3,
            complete: false,
            owner_id,
        }
    }

    #[tokio::test]
    async fn test_committed_writes_are_visible() {
        let store = MemoryStore::new();

        let mut session = store.begin().await.unwrap();
        let alice = session.create_user(new_user("alice")).await.unwrap();
        session.commit().await.unwrap();
        drop(session);

        let mut session = store.begin().await.unwrap();
        let found = session.user_by_username("alice").await.unwrap().unwrap();
        assert_eq!(found.id, alice.id);
        assert!(found.is_active);
    }

    #[tokio::test]
    async fn test_dropped_session_rolls_back() {
        let store = MemoryStore::new();

        {
            let mut session = store.begin().await.unwrap();
            session.create_user(new_user("alice")).await.unwrap();
            // dropped without commit
        }

        let mut session = store.begin().await.unwrap();
        assert!(session.user_by_username("alice").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_session_closed_after_commit() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();
        session.commit().await.unwrap();

        assert!(matches!(
            session.user_by_id(1).await,
            Err(StoreError::SessionClosed)
        ));
        assert!(matches!(session.commit().await, Err(StoreError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_unique_constraints() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();

        let alice = session.create_user(new_user("alice")).await.unwrap();
        let bob = session.create_user(new_user("bob")).await.unwrap();

        let mut duplicate_email = new_user("alice2");
        duplicate_email.email = "alice@example.com".to_string();
        assert!(matches!(
            session.create_user(duplicate_email).await,
            Err(StoreError::ConstraintViolation(_))
        ));
        assert!(matches!(
            session.create_user(new_user("alice")).await,
            Err(StoreError::ConstraintViolation(_))
        ));

        assert!(session.update_phone_number(alice.id, "555-0100").await.unwrap());
        assert!(matches!(
            session.update_phone_number(bob.id, "555-0100").await,
            Err(StoreError::ConstraintViolation(_))
        ));

        // Re-setting one's own number is fine.
        assert!(session.update_phone_number(alice.id, "555-0100").await.unwrap());
        assert!(!session.update_phone_number(999, "555-0199").await.unwrap());
    }

    #[tokio::test]
    async fn test_todo_owner_must_exist() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();

        assert!(matches!(
            session.create_todo(new_todo("orphan", 42)).await,
            Err(StoreError::ConstraintViolation(_))
        ));
    }

    #[tokio::test]
    async fn test_todos_are_scoped_by_owner() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();

        let alice = session.create_user(new_user("alice")).await.unwrap();
        let bob = session.create_user(new_user("bob")).await.unwrap();

        let milk = session.create_todo(new_todo("Buy milk", alice.id)).await.unwrap();
        session.create_todo(new_todo("Walk dog", bob.id)).await.unwrap();

        let alice_todos = session.todos_for_owner(alice.id).await.unwrap();
        assert_eq!(alice_todos.len(), 1);
        assert!(alice_todos.iter().all(|t| t.owner_id == alice.id));

        assert!(session.todo_for_owner(milk.id, bob.id).await.unwrap().is_none());
        assert!(!session.delete_todo(milk.id, bob.id).await.unwrap());

        let mut stolen = milk.clone();
        stolen.owner_id = bob.id;
        stolen.title = "Stolen".to_string();
        assert!(!session.save_todo(&stolen).await.unwrap());

        let stored = session.todo_for_owner(milk.id, alice.id).await.unwrap().unwrap();
        assert_eq!(stored.title, "Buy milk");

        assert!(session.delete_todo(milk.id, alice.id).await.unwrap());
        assert!(session.todo_for_owner(milk.id, alice.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let store = MemoryStore::new();
        let mut session = store.begin().await.unwrap();
        let alice = session.create_user(new_user("alice")).await.unwrap();

        let first = session.create_todo(new_todo("one", alice.id)).await.unwrap();
        session.delete_todo(first.id, alice.id).await.unwrap();
        let second = session.create_todo(new_todo("two", alice.id)).await.unwrap();

        assert!(second.id > first.id);
    }
}
