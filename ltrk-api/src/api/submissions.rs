//! Marketer-facing submission endpoints

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use ltrk_common::auth::AuthUser;
use ltrk_common::db::models::SubmissionStatus;
use ltrk_common::time;
use ltrk_common::{Error, Result};

use crate::api::views::{
    fetch_submission_view, list_submission_views, SubmissionQuery, SubmissionView,
};
use crate::api::ApiError;
use crate::leads::chain::{chain_for_submission, ChainMember};
use crate::leads::ingest::{self, NewLead};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateSubmissionRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub project_interest_id: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateFollowUpRequest {
    pub follow_up_status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChainResponse {
    /// Tier of the requested submission within its chain
    pub tier: i64,
    pub chain: Vec<ChainMember>,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_submissions: i64,
    pub owned_submissions: i64,
    pub duplicate_submissions: i64,
    pub expired_submissions: i64,
    pub hot_leads: i64,
}

/// POST /submissions - ingest a new lead
pub async fn create_submission(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateSubmissionRequest>,
) -> std::result::Result<(StatusCode, Json<SubmissionView>), ApiError> {
    let submission = ingest::create_submission(
        &state.db,
        state.policy,
        &state.locks,
        &user.user_id,
        NewLead {
            name: request.name,
            phone_number: request.phone_number,
            project_interest_id: request.project_interest_id,
            notes: request.notes,
        },
    )
    .await?;

    let view = fetch_submission_view(&state.db, state.policy, &submission.guid).await?;
    Ok((StatusCode::CREATED, Json(view)))
}

/// GET /submissions - the caller's submissions, filtered, newest first
pub async fn list_submissions(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<ListParams>,
) -> std::result::Result<Json<Vec<SubmissionView>>, ApiError> {
    let query = SubmissionQuery {
        user_id: Some(user.user_id),
        status: parse_status_filter(params.status.as_deref())?,
        date_from: params.date_from,
        date_to: params.date_to,
        search: params.search,
        only_hot: false,
    };

    let views = list_submission_views(&state.db, state.policy, &query).await?;
    Ok(Json(views))
}

/// GET /submissions/hot-leads - every submission in a hot group
pub async fn hot_leads(
    State(state): State<AppState>,
) -> std::result::Result<Json<Vec<SubmissionView>>, ApiError> {
    let query = SubmissionQuery {
        only_hot: true,
        ..SubmissionQuery::default()
    };

    let views = list_submission_views(&state.db, state.policy, &query).await?;
    Ok(Json(views))
}

/// GET /submissions/:id/chain - the duplicate chain containing a submission
pub async fn get_chain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> std::result::Result<Json<ChainResponse>, ApiError> {
    let (chain, tier) = chain_for_submission(&state.db, state.policy, &id).await?;
    Ok(Json(ChainResponse { tier, chain }))
}

/// PUT /submissions/:id - update follow-up status on an owned row
///
/// Only the follow-up field is writable through this endpoint; 404 covers
/// both a missing row and a row belonging to another marketer.
pub async fn update_follow_up(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<UpdateFollowUpRequest>,
) -> std::result::Result<Json<SubmissionView>, ApiError> {
    let result = sqlx::query(
        "UPDATE submissions SET follow_up_status = ?, updated_at = ? WHERE guid = ? AND user_id = ?",
    )
    .bind(&request.follow_up_status)
    .bind(time::now_rfc3339())
    .bind(&id)
    .bind(&user.user_id)
    .execute(&state.db)
    .await
    .map_err(Error::from)?;

    if result.rows_affected() == 0 {
        return Err(Error::NotFound("submission not found or not owned by caller".into()).into());
    }

    let view = fetch_submission_view(&state.db, state.policy, &id).await?;
    Ok(Json(view))
}

/// GET /submissions/stats - simple counts for the caller
pub async fn my_stats(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> std::result::Result<Json<StatsResponse>, ApiError> {
    let stats = status_counts(&state.db, Some(&user.user_id)).await?;
    Ok(Json(stats))
}

/// Parse a status query parameter, rejecting unknown values with 400
pub(crate) fn parse_status_filter(value: Option<&str>) -> Result<Option<SubmissionStatus>> {
    match value {
        None | Some("") => Ok(None),
        Some(raw) => SubmissionStatus::parse(raw)
            .map(Some)
            .map_err(|_| Error::Validation(format!("unknown status filter '{}'", raw))),
    }
}

/// Count submissions by status (and hot flag), optionally for one submitter
pub(crate) async fn status_counts(
    pool: &sqlx::SqlitePool,
    user_id: Option<&str>,
) -> Result<StatsResponse> {
    let mut sql = String::from("SELECT status, COUNT(*) FROM submissions");
    if user_id.is_some() {
        sql.push_str(" WHERE user_id = ?");
    }
    sql.push_str(" GROUP BY status");

    let mut query = sqlx::query_as::<_, (String, i64)>(&sql);
    if let Some(user_id) = user_id {
        query = query.bind(user_id);
    }
    let rows = query.fetch_all(pool).await?;

    let mut stats = StatsResponse {
        total_submissions: 0,
        owned_submissions: 0,
        duplicate_submissions: 0,
        expired_submissions: 0,
        hot_leads: 0,
    };
    for (status, count) in rows {
        stats.total_submissions += count;
        match SubmissionStatus::parse(&status)? {
            SubmissionStatus::Owned => stats.owned_submissions += count,
            SubmissionStatus::Duplicate => stats.duplicate_submissions += count,
            SubmissionStatus::Expired => stats.expired_submissions += count,
            SubmissionStatus::Pending => {}
        }
    }

    let mut hot_sql = String::from("SELECT COUNT(*) FROM submissions WHERE is_hot_lead = 1");
    if user_id.is_some() {
        hot_sql.push_str(" AND user_id = ?");
    }
    let mut hot_query = sqlx::query_scalar::<_, i64>(&hot_sql);
    if let Some(user_id) = user_id {
        hot_query = hot_query.bind(user_id);
    }
    stats.hot_leads = hot_query.fetch_one(pool).await?;

    Ok(stats)
}
