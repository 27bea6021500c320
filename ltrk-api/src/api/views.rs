//! Submission views
//!
//! Rows joined with owner and project display fields, plus the derived chain
//! annotations (tier, sibling list) recomputed on every read.

use serde::Serialize;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};

use ltrk_common::db::models::SubmissionStatus;
use ltrk_common::{Error, Result};

use crate::leads::chain::{fetch_chain, ChainMember};
use crate::leads::policy::{DedupKey, DedupPolicy};

/// One submission as returned by the listing and mutation endpoints
#[derive(Debug, Serialize)]
pub struct SubmissionView {
    pub guid: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub name: String,
    pub phone_number: String,
    pub project_interest_id: String,
    pub project_name: String,
    pub notes: Option<String>,
    pub status: SubmissionStatus,
    pub follow_up_status: Option<String>,
    pub is_hot_lead: bool,
    pub original_submission_id: Option<String>,
    pub ownership_expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    /// 1-based rank within the dedup-key group, derived on read
    pub duplicate_tier: i64,
    /// Sibling submissions sharing the dedup key; present when the group has
    /// more than one member
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplicate_chain: Option<Vec<ChainMember>>,
}

/// Filter set accepted by the listing endpoints
#[derive(Debug, Default)]
pub struct SubmissionQuery {
    /// Restrict to one submitter (the caller, or an admin's marketer filter)
    pub user_id: Option<String>,
    pub status: Option<SubmissionStatus>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    /// Free-text match over contact name, phone number, and project name
    pub search: Option<String>,
    pub only_hot: bool,
}

const VIEW_SELECT: &str = "SELECT s.guid, s.user_id, u.name, u.email, s.name, s.phone_number, \
     s.project_interest_id, p.name, s.notes, s.status, s.follow_up_status, \
     s.is_hot_lead, s.original_submission_id, s.ownership_expires_at, \
     s.created_at, s.updated_at \
     FROM submissions s \
     JOIN users u ON u.guid = s.user_id \
     JOIN project_interests p ON p.guid = s.project_interest_id";

fn view_from_row(row: &SqliteRow) -> Result<SubmissionView> {
    let status: String = row.try_get(9)?;
    let is_hot_lead: i64 = row.try_get(11)?;

    Ok(SubmissionView {
        guid: row.try_get(0)?,
        user_id: row.try_get(1)?,
        user_name: row.try_get(2)?,
        user_email: row.try_get(3)?,
        name: row.try_get(4)?,
        phone_number: row.try_get(5)?,
        project_interest_id: row.try_get(6)?,
        project_name: row.try_get(7)?,
        notes: row.try_get(8)?,
        status: SubmissionStatus::parse(&status)?,
        follow_up_status: row.try_get(10)?,
        is_hot_lead: is_hot_lead != 0,
        original_submission_id: row.try_get(12)?,
        ownership_expires_at: row.try_get(13)?,
        created_at: row.try_get(14)?,
        updated_at: row.try_get(15)?,
        duplicate_tier: 1,
        duplicate_chain: None,
    })
}

/// List submissions matching the query, newest first, chains annotated
pub async fn list_submission_views(
    pool: &SqlitePool,
    policy: DedupPolicy,
    query: &SubmissionQuery,
) -> Result<Vec<SubmissionView>> {
    let mut sql = format!("{} WHERE 1 = 1", VIEW_SELECT);
    let mut binds: Vec<String> = Vec::new();

    if let Some(user_id) = &query.user_id {
        sql.push_str(" AND s.user_id = ?");
        binds.push(user_id.clone());
    }
    if let Some(status) = query.status {
        sql.push_str(" AND s.status = ?");
        binds.push(status.as_str().to_string());
    }
    if let Some(date_from) = &query.date_from {
        sql.push_str(" AND s.created_at >= ?");
        binds.push(date_from.clone());
    }
    if let Some(date_to) = &query.date_to {
        sql.push_str(" AND s.created_at <= ?");
        binds.push(date_to.clone());
    }
    if query.only_hot {
        sql.push_str(" AND s.is_hot_lead = 1");
    }
    if let Some(search) = &query.search {
        sql.push_str(" AND (s.name LIKE ? OR s.phone_number LIKE ? OR p.name LIKE ?)");
        let pattern = format!("%{}%", search);
        binds.push(pattern.clone());
        binds.push(pattern.clone());
        binds.push(pattern);
    }
    sql.push_str(" ORDER BY s.created_at DESC");

    let mut q = sqlx::query(&sql);
    for bind in &binds {
        q = q.bind(bind);
    }
    let rows = q.fetch_all(pool).await?;

    let mut views = Vec::with_capacity(rows.len());
    for row in &rows {
        let view = view_from_row(row)?;
        views.push(annotate_chain(pool, policy, view).await?);
    }

    Ok(views)
}

/// Fetch one submission view by guid, chain annotated
pub async fn fetch_submission_view(
    pool: &SqlitePool,
    policy: DedupPolicy,
    guid: &str,
) -> Result<SubmissionView> {
    let sql = format!("{} WHERE s.guid = ?", VIEW_SELECT);
    let row = sqlx::query(&sql).bind(guid).fetch_optional(pool).await?;

    match row {
        Some(row) => annotate_chain(pool, policy, view_from_row(&row)?).await,
        None => Err(Error::NotFound(format!("submission {} not found", guid))),
    }
}

/// Attach tier and sibling chain. Chains with a single member stay bare: the
/// submission is tier 1 by definition and there is nothing to display.
async fn annotate_chain(
    pool: &SqlitePool,
    policy: DedupPolicy,
    mut view: SubmissionView,
) -> Result<SubmissionView> {
    if !matches!(
        view.status,
        SubmissionStatus::Owned | SubmissionStatus::Duplicate
    ) {
        return Ok(view);
    }

    let key = DedupKey::new(view.phone_number.clone(), view.project_interest_id.clone());
    let chain = fetch_chain(pool, policy, &key).await?;

    if let Some(member) = chain.iter().find(|member| member.id == view.guid) {
        view.duplicate_tier = member.tier;
    }
    if chain.len() > 1 {
        view.duplicate_chain = Some(chain);
    }

    Ok(view)
}
