//! Admin-only endpoints: full submission visibility, ownership override,
//! audit trail, and maintenance sweeps

use axum::extract::{Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use ltrk_common::auth::AuthUser;
use ltrk_common::Error;

use crate::api::submissions::{parse_status_filter, status_counts, StatsResponse};
use crate::api::views::{
    fetch_submission_view, list_submission_views, SubmissionQuery, SubmissionView,
};
use crate::api::ApiError;
use crate::leads::ownership::{self, OverrideRequest};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct AdminListParams {
    pub status: Option<String>,
    pub marketer_id: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OverrideOwnershipRequest {
    #[serde(default)]
    pub submission_id: String,
    #[serde(default)]
    pub new_owner_id: String,
    #[serde(default)]
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct OverrideLogView {
    pub guid: String,
    pub admin_id: String,
    pub admin_name: String,
    pub submission_id: String,
    pub contact_name: String,
    pub old_owner_id: String,
    pub old_owner_name: Option<String>,
    pub new_owner_id: String,
    pub new_owner_name: Option<String>,
    pub reason: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct AdminStatsResponse {
    #[serde(flatten)]
    pub submissions: StatsResponse,
    pub total_marketers: i64,
}

#[derive(Debug, Serialize)]
pub struct ExpireResponse {
    pub expired: u64,
}

/// GET /admin/submissions - all submissions, filtered, newest first
pub async fn list_all_submissions(
    State(state): State<AppState>,
    Query(params): Query<AdminListParams>,
) -> Result<Json<Vec<SubmissionView>>, ApiError> {
    let query = SubmissionQuery {
        user_id: params.marketer_id,
        status: parse_status_filter(params.status.as_deref())?,
        date_from: params.date_from,
        date_to: params.date_to,
        search: params.search,
        only_hot: false,
    };

    let views = list_submission_views(&state.db, state.policy, &query).await?;
    Ok(Json(views))
}

/// POST /admin/override-ownership - forcibly reassign a lead
pub async fn override_ownership(
    State(state): State<AppState>,
    Extension(admin): Extension<AuthUser>,
    Json(request): Json<OverrideOwnershipRequest>,
) -> Result<Json<SubmissionView>, ApiError> {
    if request.submission_id.trim().is_empty() || request.new_owner_id.trim().is_empty() {
        return Err(
            Error::Validation("submission_id and new_owner_id are required".into()).into(),
        );
    }

    let submission = ownership::override_ownership(
        &state.db,
        state.policy,
        &state.locks,
        &admin.user_id,
        OverrideRequest {
            submission_id: request.submission_id,
            new_owner_id: request.new_owner_id,
            reason: request.reason,
        },
    )
    .await?;

    let view = fetch_submission_view(&state.db, state.policy, &submission.guid).await?;
    Ok(Json(view))
}

/// GET /admin/override-logs - audit trail, newest first
pub async fn override_logs(
    State(state): State<AppState>,
) -> Result<Json<Vec<OverrideLogView>>, ApiError> {
    // Owner joins are LEFT: account deletion cascades may have removed the
    // user rows the log refers to, the audit entry itself stays
    let rows: Vec<(
        String,
        String,
        String,
        String,
        String,
        String,
        Option<String>,
        String,
        Option<String>,
        String,
        String,
    )> = sqlx::query_as(
        r#"
        SELECT ol.guid, ol.admin_id, a.name, ol.submission_id, s.name,
               ol.old_owner_id, oldu.name, ol.new_owner_id, newu.name,
               ol.reason, ol.created_at
        FROM override_logs ol
        JOIN users a ON a.guid = ol.admin_id
        JOIN submissions s ON s.guid = ol.submission_id
        LEFT JOIN users oldu ON oldu.guid = ol.old_owner_id
        LEFT JOIN users newu ON newu.guid = ol.new_owner_id
        ORDER BY ol.created_at DESC
        "#,
    )
    .fetch_all(&state.db)
    .await
    .map_err(Error::from)?;

    let views = rows
        .into_iter()
        .map(
            |(
                guid,
                admin_id,
                admin_name,
                submission_id,
                contact_name,
                old_owner_id,
                old_owner_name,
                new_owner_id,
                new_owner_name,
                reason,
                created_at,
            )| OverrideLogView {
                guid,
                admin_id,
                admin_name,
                submission_id,
                contact_name,
                old_owner_id,
                old_owner_name,
                new_owner_id,
                new_owner_name,
                reason,
                created_at,
            },
        )
        .collect();

    Ok(Json(views))
}

/// GET /admin/stats - simple counts across the whole system
pub async fn admin_stats(
    State(state): State<AppState>,
) -> Result<Json<AdminStatsResponse>, ApiError> {
    let submissions = status_counts(&state.db, None).await?;

    let total_marketers: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'marketer'")
            .fetch_one(&state.db)
            .await
            .map_err(Error::from)?;

    Ok(Json(AdminStatsResponse {
        submissions,
        total_marketers,
    }))
}

/// POST /admin/expire-ownership - sweep lapsed ownership across all groups
pub async fn expire_ownership(
    State(state): State<AppState>,
) -> Result<Json<ExpireResponse>, ApiError> {
    let expired = ownership::expire_all_lapsed(&state.db).await?;
    Ok(Json(ExpireResponse { expired }))
}
