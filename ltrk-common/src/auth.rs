//! Bearer-token identity resolution
//!
//! The service never sees passwords or issues its own credentials; token
//! issuance mechanics live outside this repository. What it does hold is the
//! sessions table: an opaque bearer token, stored hashed, mapping to a user
//! and an expiry. `resolve_token` turns a presented credential into a
//! (user id, role) pair or an `Unauthorized` error - nothing more reaches the
//! core logic.

use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::db::models::Role;
use crate::time;
use crate::{Error, Result};

/// Identity resolved from a bearer credential
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub role: Role,
}

/// Hash a bearer token for storage or lookup (SHA-256, 64 hex chars)
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Generate a new opaque bearer token (32 random bytes, hex-encoded)
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Create a session for a user and return the raw bearer token
///
/// Only the SHA-256 of the token is persisted. Used by tests and by
/// operational seeding; the service itself has no login endpoint.
pub async fn create_session(pool: &SqlitePool, user_id: &str, ttl_seconds: i64) -> Result<String> {
    let token = generate_token();

    sqlx::query(
        "INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
    )
    .bind(hash_token(&token))
    .bind(user_id)
    .bind(time::now_rfc3339())
    .bind(time::seconds_from_now_rfc3339(ttl_seconds))
    .execute(pool)
    .await?;

    Ok(token)
}

/// Resolve a bearer token to a (user id, role) pair
///
/// Fails with `Unauthorized` when the token is unknown, expired, or the user
/// row is gone.
pub async fn resolve_token(pool: &SqlitePool, token: &str) -> Result<AuthUser> {
    let row: Option<(String, String, String)> = sqlx::query_as(
        r#"
        SELECT u.guid, u.role, s.expires_at
        FROM sessions s
        JOIN users u ON u.guid = s.user_id
        WHERE s.token_hash = ?
        "#,
    )
    .bind(hash_token(token))
    .fetch_optional(pool)
    .await?;

    let (user_id, role, expires_at) = match row {
        Some(row) => row,
        None => return Err(Error::Unauthorized("invalid credential".into())),
    };

    if expires_at <= time::now_rfc3339() {
        return Err(Error::Unauthorized("credential expired".into()));
    }

    Ok(AuthUser {
        user_id,
        role: Role::parse(&role)?,
    })
}

/// Delete sessions whose expiry has passed. Returns the number removed.
pub async fn purge_expired_sessions(pool: &SqlitePool) -> Result<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(time::now_rfc3339())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
