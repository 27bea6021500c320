//! ltrk-api library - lead-submission tracking service
//!
//! Marketers submit contact leads; the service detects duplicate submissions
//! across marketers, assigns ownership, and flags dedup-key groups as hot
//! leads once enough independent marketers have submitted the same contact.
//! Administrators can override ownership (audited) and query everything.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{get, post, put};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::leads::locks::KeyLocks;
use crate::leads::policy::DedupPolicy;

pub mod api;
pub mod leads;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Duplicate-detection policy, chosen once at the system boundary
    pub policy: DedupPolicy,
    /// Per-dedup-key serialization for the read-decide-insert sequence
    pub locks: Arc<KeyLocks>,
}

impl AppState {
    /// Create application state with the canonical dedup policy
    pub fn new(db: SqlitePool) -> Self {
        Self::with_policy(db, DedupPolicy::default())
    }

    /// Create application state with an explicit dedup policy
    pub fn with_policy(db: SqlitePool, policy: DedupPolicy) -> Self {
        Self {
            db,
            policy,
            locks: Arc::new(KeyLocks::new()),
        }
    }
}

/// Build application router
///
/// Authentication is a single middleware in front of every protected route;
/// handlers only ever see the resolved (user id, role) pair. Role gates are
/// separate route layers so the marketer and admin surfaces cannot drift.
pub fn build_router(state: AppState) -> Router {
    // Marketer-only routes
    let marketer = Router::new()
        .route("/submissions", post(api::submissions::create_submission))
        .route("/submissions/:id", put(api::submissions::update_follow_up))
        .route_layer(middleware::from_fn(api::auth::require_marketer));

    // Routes for any authenticated user
    let authed = Router::new()
        .route("/submissions", get(api::submissions::list_submissions))
        .route("/submissions/hot-leads", get(api::submissions::hot_leads))
        .route("/submissions/stats", get(api::submissions::my_stats))
        .route("/submissions/:id/chain", get(api::submissions::get_chain))
        .route("/projects", get(api::projects::list_projects));

    // Admin-only routes
    let admin = Router::new()
        .route("/admin/submissions", get(api::admin::list_all_submissions))
        .route("/admin/override-ownership", post(api::admin::override_ownership))
        .route("/admin/override-logs", get(api::admin::override_logs))
        .route("/admin/stats", get(api::admin::admin_stats))
        .route("/admin/expire-ownership", post(api::admin::expire_ownership))
        .route_layer(middleware::from_fn(api::auth::require_admin));

    let protected = Router::new()
        .merge(marketer)
        .merge(authed)
        .merge(admin)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::authenticate,
        ));

    // Public routes (no authentication)
    Router::new()
        .merge(protected)
        .merge(api::health::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
