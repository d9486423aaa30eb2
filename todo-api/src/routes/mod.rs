/// JSON API route handlers
///
/// - `health`: Health check endpoint (both surfaces)
/// - `auth`: Registration and token login
/// - `users`: Profile, password and phone number of the caller
/// - `todos`: Todo CRUD scoped to the caller

pub mod auth;
pub mod health;
pub mod todos;
pub mod users;
