/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: token issuance and resolution into an [`jwt::Identity`]
/// - [`middleware`]: pulling credentials out of request headers and cookies
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use todo_shared::auth::{jwt, password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = password::hash_password("pw123456")?;
/// assert!(password::verify_password("pw123456", &hash)?);
///
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = jwt::issue_token("alice", 1, None, Duration::minutes(30), secret)?;
/// assert_eq!(jwt::resolve_token(&token, secret)?.id, 1);
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
