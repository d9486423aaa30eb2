/// JWT token issuance and resolution
///
/// Tokens are the only authorization credential in the system. They carry the
/// username (`sub`), the numeric user id (`id`), an optional role and an
/// absolute expiry, and are signed with HS256 using the configured secret.
///
/// # Validation rules
///
/// - signature must match the secret
/// - `exp` is required and checked with zero leeway
/// - `sub` and `id` must both be present
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use todo_shared::auth::jwt::{issue_token, resolve_token};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let secret = "test-secret-key-at-least-32-bytes-long";
/// let token = issue_token("alice", 1, Some("admin"), Duration::minutes(30), secret)?;
///
/// let identity = resolve_token(&token, secret)?;
/// assert_eq!(identity.username, "alice");
/// assert_eq!(identity.id, 1);
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

/// Fixed signing algorithm
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Signature mismatch, malformed structure, or expired
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// A required claim is absent
    #[error("Token is missing the '{0}' claim")]
    MissingClaim(&'static str),
}

/// JWT claims structure
///
/// `sub`, `id` and `exp` are optional at the type level: claims are
/// deserialized before the required-claim check runs, so a signed token
/// lacking one of them must still parse to be reported as `MissingClaim`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - username
    pub sub: Option<String>,

    /// User ID
    pub id: Option<i64>,

    /// Optional role
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

impl Claims {
    /// Creates claims that expire `ttl` from now
    pub fn new(username: &str, user_id: i64, role: Option<&str>, ttl: Duration) -> Self {
        Self::issued_at(username, user_id, role, ttl, Utc::now())
    }

    /// Creates claims as if issued at `now`
    pub fn issued_at(
        username: &str,
        user_id: i64,
        role: Option<&str>,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            sub: Some(username.to_string()),
            id: Some(user_id),
            role: role.map(str::to_string),
            iat: Some(now.timestamp()),
            exp: Some((now + ttl).timestamp()),
        }
    }
}

/// Caller identity resolved from a valid token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Username (token subject)
    pub username: String,

    /// User ID
    pub id: i64,

    /// Role, when the token carried one
    pub role: Option<String>,
}

/// Signs claims with HS256
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::new(ALGORITHM), claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Issues a token for a user that is valid for `ttl`
///
/// # Errors
///
/// Returns `JwtError::CreateError` if encoding fails
pub fn issue_token(
    username: &str,
    user_id: i64,
    role: Option<&str>,
    ttl: Duration,
    secret: &str,
) -> Result<String, JwtError> {
    create_token(&Claims::new(username, user_id, role, ttl), secret)
}

/// Decodes and verifies a token, returning its raw claims
///
/// # Errors
///
/// - `JwtError::InvalidToken` on bad signature, malformed input or expiry
/// - `JwtError::MissingClaim("exp")` if the token has no expiry
pub fn decode_claims(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::InvalidToken("Token has expired".to_string()),
        ErrorKind::MissingRequiredClaim(claim) if claim == "exp" => JwtError::MissingClaim("exp"),
        _ => JwtError::InvalidToken(e.to_string()),
    })?;

    if token_data.claims.exp.is_none() {
        return Err(JwtError::MissingClaim("exp"));
    }

    Ok(token_data.claims)
}

/// Resolves a token into the caller's identity
///
/// # Errors
///
/// - `JwtError::InvalidToken` on bad signature, malformed input or expiry
/// - `JwtError::MissingClaim` when `sub`, `id` or `exp` is absent
pub fn resolve_token(token: &str, secret: &str) -> Result<Identity, JwtError> {
    let claims = decode_claims(token, secret)?;

    let username = claims.sub.ok_or(JwtError::MissingClaim("sub"))?;
    let id = claims.id.ok_or(JwtError::MissingClaim("id"))?;

    Ok(Identity {
        username,
        id,
        role: claims.role,
    })
}
