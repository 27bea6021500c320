//! Database initialization
//!
//! Creates the schema idempotently on startup and seeds the rows the service
//! cannot run without (default settings, the bootstrap administrator).

use crate::db::models::Role;
use crate::time;
use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Bootstrap administrator guid, seeded on first run
pub const BOOTSTRAP_ADMIN_GUID: &str = "00000000-0000-0000-0000-000000000001";

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL mode: concurrent readers with one writer
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Schema creation (idempotent - safe to call multiple times)
    create_users_table(&pool).await?;
    create_sessions_table(&pool).await?;
    create_project_interests_table(&pool).await?;
    create_submissions_table(&pool).await?;
    create_override_logs_table(&pool).await?;
    create_settings_table(&pool).await?;

    init_default_settings(&pool).await?;

    Ok(pool)
}

async fn create_users_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL UNIQUE,
            phone TEXT,
            role TEXT NOT NULL CHECK (role IN ('admin', 'marketer')),
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)")
        .execute(pool)
        .await?;

    // Seed the bootstrap administrator if absent. Account management is
    // handled out of band; this row only guarantees an admin exists.
    let now = time::now_rfc3339();
    sqlx::query(
        r#"
        INSERT OR IGNORE INTO users (guid, name, email, phone, role, created_at, updated_at)
        VALUES (?, 'Administrator', 'admin@leadtrk.local', NULL, ?, ?, ?)
        "#,
    )
    .bind(BOOTSTRAP_ADMIN_GUID)
    .bind(Role::Admin.as_str())
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_sessions_table(pool: &SqlitePool) -> Result<()> {
    // Bearer tokens are stored hashed; the raw token never touches disk.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            token_hash TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            created_at TEXT NOT NULL,
            expires_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_sessions_expires ON sessions(expires_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_project_interests_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS project_interests (
            guid TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT,
            active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Create the submissions table
///
/// Duplicate tier and chain membership are derived on read, never stored.
/// The partial unique index is the storage backstop for the one-owner-per-key
/// invariant: two `owned` rows for the same (phone_number,
/// project_interest_id) cannot coexist, whatever the application layer does.
pub async fn create_submissions_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS submissions (
            guid TEXT PRIMARY KEY,
            user_id TEXT NOT NULL REFERENCES users(guid) ON DELETE CASCADE,
            name TEXT NOT NULL,
            phone_number TEXT NOT NULL,
            project_interest_id TEXT NOT NULL REFERENCES project_interests(guid),
            notes TEXT,
            status TEXT NOT NULL CHECK (status IN ('pending', 'owned', 'duplicate', 'expired')),
            follow_up_status TEXT,
            is_hot_lead INTEGER NOT NULL DEFAULT 0,
            original_submission_id TEXT REFERENCES submissions(guid),
            ownership_expires_at TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            CHECK (length(phone_number) > 0),
            CHECK (length(name) > 0)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // At most one owned row per dedup key
    sqlx::query(
        r#"
        CREATE UNIQUE INDEX IF NOT EXISTS idx_submissions_unique_owner
        ON submissions(phone_number, project_interest_id)
        WHERE status = 'owned'
        "#,
    )
    .execute(pool)
    .await?;

    // Chain fetches filter on the dedup key and sort by creation time
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_submissions_dedup_key
        ON submissions(phone_number, project_interest_id, created_at)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_submissions_user ON submissions(user_id)")
        .execute(pool)
        .await?;
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_submissions_hot ON submissions(is_hot_lead)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_override_logs_table(pool: &SqlitePool) -> Result<()> {
    // Append-only audit trail. No UPDATE or DELETE is ever issued against it.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS override_logs (
            guid TEXT PRIMARY KEY,
            admin_id TEXT NOT NULL REFERENCES users(guid),
            submission_id TEXT NOT NULL REFERENCES submissions(guid),
            old_owner_id TEXT NOT NULL,
            new_owner_id TEXT NOT NULL,
            reason TEXT NOT NULL CHECK (length(reason) > 0),
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_override_logs_created ON override_logs(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

/// Create the settings table
///
/// Stores application configuration key-value pairs.
pub async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT,
            updated_at TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Initialize or update default settings
async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    ensure_setting(pool, "http_port", "5730").await?;
    ensure_setting(pool, "session_ttl_seconds", "2592000").await?; // 30 days

    info!("Default settings initialized");
    Ok(())
}

/// Ensure a setting exists with the specified default value
///
/// If the setting doesn't exist, it is created with the default. If it exists
/// with a NULL value, it is reset to the default.
pub async fn ensure_setting(pool: &SqlitePool, key: &str, default_value: &str) -> Result<()> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM settings WHERE key = ?)")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if !exists {
        // INSERT OR IGNORE: concurrent initializers may race past the check
        sqlx::query("INSERT OR IGNORE INTO settings (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(default_value)
            .execute(pool)
            .await?;
        return Ok(());
    }

    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
        .bind(key)
        .fetch_one(pool)
        .await?;

    if value.is_none() {
        sqlx::query("UPDATE settings SET value = ? WHERE key = ?")
            .bind(default_value)
            .bind(key)
            .execute(pool)
            .await?;
    }

    Ok(())
}

/// Read a setting, falling back to the given default when absent or NULL
pub async fn get_setting_or(pool: &SqlitePool, key: &str, default_value: &str) -> Result<String> {
    let value: Option<Option<String>> =
        sqlx::query_scalar("SELECT value FROM settings WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;

    Ok(value.flatten().unwrap_or_else(|| default_value.to_string()))
}
