//! # Todo Shared Library
//!
//! Types and storage shared by the todo API and its web frontend.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, JWT issuing/resolution, credential extraction
//! - `db`: connection pool, migrations, and the session-based store
//! - `models`: users and todos

pub mod auth;
pub mod db;
pub mod models;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
