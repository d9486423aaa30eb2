/// User model and its SQL
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(100) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     hashed_password VARCHAR(255) NOT NULL,
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     role VARCHAR(50) NOT NULL DEFAULT 'user',
///     phone_number VARCHAR(20) UNIQUE          -- added by the second migration
/// );
/// ```
///
/// The query functions take a bare connection so they can run inside the
/// transaction owned by a request's session.

use serde::{Deserialize, Serialize};
use sqlx::PgConnection;

const USER_COLUMNS: &str =
    "id, username, email, first_name, last_name, hashed_password, is_active, role, phone_number";

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: i64,

    /// Login name, unique
    pub username: String,

    /// Email address, unique
    pub email: String,

    pub first_name: String,

    pub last_name: String,

    /// Argon2id PHC string, never serialized
    #[serde(skip_serializing, default)]
    pub hashed_password: String,

    pub is_active: bool,

    /// Free-form role name (e.g. "user", "admin")
    pub role: String,

    /// Optional phone number, unique when present
    pub phone_number: Option<String>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,

    /// Argon2id hash (NOT the plaintext password)
    pub hashed_password: String,

    pub role: String,
}

impl User {
    /// Inserts a new active user
    ///
    /// # Errors
    ///
    /// Fails on unique violations (username, email) or connection problems.
    pub async fn create(conn: &mut PgConnection, data: NewUser) -> Result<Self, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (username, email, first_name, last_name, hashed_password, is_active, role) \
             VALUES ($1, $2, $3, $4, $5, TRUE, $6) \
             RETURNING {USER_COLUMNS}"
        );

        sqlx::query_as::<_, User>(&query)
            .bind(data.username)
            .bind(data.email)
            .bind(data.first_name)
            .bind(data.last_name)
            .bind(data.hashed_password)
            .bind(data.role)
            .fetch_one(conn)
            .await
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// Finds a user by username (exact match)
    pub async fn find_by_username(
        conn: &mut PgConnection,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(username)
            .fetch_optional(conn)
            .await
    }

    /// Finds a user by email (exact match)
    pub async fn find_by_email(
        conn: &mut PgConnection,
        email: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(conn)
            .await
    }

    /// Replaces the stored password hash
    ///
    /// Returns false if no such user exists.
    pub async fn update_password(
        conn: &mut PgConnection,
        id: i64,
        hashed_password: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET hashed_password = $2 WHERE id = $1")
            .bind(id)
            .bind(hashed_password)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Replaces the stored phone number
    ///
    /// No uniqueness pre-check; a duplicate fails on the unique constraint.
    pub async fn update_phone_number(
        conn: &mut PgConnection,
        id: i64,
        phone_number: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET phone_number = $2 WHERE id = $1")
            .bind(id)
            .bind(phone_number)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
