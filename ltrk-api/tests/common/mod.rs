//! Shared setup for ltrk-api integration tests
#![allow(dead_code)]

use ltrk_api::{build_router, AppState};
use ltrk_common::auth::create_session;
use ltrk_common::db::init::init_database;
use ltrk_common::db::models::new_guid;
use ltrk_common::time;
use sqlx::SqlitePool;
use std::path::PathBuf;

pub struct TestContext {
    pub pool: SqlitePool,
    pub state: AppState,
    db_path: PathBuf,
}

impl TestContext {
    pub fn app(&self) -> axum::Router {
        build_router(self.state.clone())
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_path);
    }
}

/// Create a fresh database and application state. `tag` must be unique per
/// test so parallel tests never share a file.
pub async fn setup(tag: &str) -> TestContext {
    let db_path = PathBuf::from(format!(
        "/tmp/ltrk-api-test-{}-{}.db",
        tag,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&db_path);

    let pool = init_database(&db_path).await.expect("init database");
    let state = AppState::new(pool.clone());

    TestContext {
        pool,
        state,
        db_path,
    }
}

/// Insert a marketer and return its guid
pub async fn seed_marketer(pool: &SqlitePool, name: &str) -> String {
    let guid = new_guid();
    let now = time::now_rfc3339();
    sqlx::query(
        "INSERT INTO users (guid, name, email, phone, role, created_at, updated_at) VALUES (?, ?, ?, NULL, 'marketer', ?, ?)",
    )
    .bind(&guid)
    .bind(name)
    .bind(format!("{}-{}@leadtrk.local", name.to_lowercase(), &guid[..8]))
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await
    .expect("insert marketer");
    guid
}

/// Insert an active project interest and return its guid
pub async fn seed_project(pool: &SqlitePool, name: &str) -> String {
    let guid = new_guid();
    sqlx::query(
        "INSERT INTO project_interests (guid, name, description, active, created_at) VALUES (?, ?, NULL, 1, ?)",
    )
    .bind(&guid)
    .bind(name)
    .bind(time::now_rfc3339())
    .execute(pool)
    .await
    .expect("insert project");
    guid
}

/// Create a session for a user and return the bearer token
pub async fn token_for(pool: &SqlitePool, user_id: &str) -> String {
    create_session(pool, user_id, 3600)
        .await
        .expect("create session")
}
