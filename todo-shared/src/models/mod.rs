/// Database models
///
/// # Models
///
/// - `user`: registered accounts and their credentials
/// - `todo`: todo items, always accessed through their owner
///
/// Each model carries its own SQL as associated functions taking a
/// `&mut PgConnection`; the [`crate::db`] layer decides which connection
/// (usually a request-scoped transaction) they run on.

pub mod todo;
pub mod user;

pub use todo::{NewTodo, Todo};
pub use user::{NewUser, User};
