//! Duplicate chain resolution and tier computation
//!
//! A chain is every submission sharing a dedup key, ordered by creation time.
//! Tier assignment is a pure function of chain membership and creation order:
//! it is recomputed on every read and never persisted, so it cannot go stale.

use serde::Serialize;
use sqlx::SqlitePool;

use ltrk_common::db::models::SubmissionStatus;
use ltrk_common::{Error, Result};

use crate::leads::policy::{DedupKey, DedupPolicy};

/// One member of a duplicate chain, annotated for display
#[derive(Debug, Clone, Serialize)]
pub struct ChainMember {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    /// 1-based rank by ascending creation time within the chain
    pub tier: i64,
    pub status: SubmissionStatus,
    pub created_at: String,
}

/// Raw chain row before tier assignment
#[derive(Debug, Clone)]
pub struct ChainRow {
    pub id: String,
    pub user_id: String,
    pub user_name: String,
    pub user_email: String,
    pub status: SubmissionStatus,
    pub created_at: String,
}

/// Assign tiers to chain rows
///
/// Sorts by (created_at, id) - the id tie-break keeps the order total when
/// two rows carry the same microsecond - and ranks from 1. Pure: the result
/// depends only on the rows passed in.
pub fn assign_tiers(mut rows: Vec<ChainRow>) -> Vec<ChainMember> {
    rows.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });

    rows.into_iter()
        .enumerate()
        .map(|(index, row)| ChainMember {
            id: row.id,
            user_id: row.user_id,
            user_name: row.user_name,
            user_email: row.user_email,
            tier: index as i64 + 1,
            status: row.status,
            created_at: row.created_at,
        })
        .collect()
}

/// The member currently holding the lead: the `owned` row if one exists,
/// otherwise the tier-1 row as the nominal original for display.
pub fn current_owner(chain: &[ChainMember]) -> Option<&ChainMember> {
    chain
        .iter()
        .find(|member| member.status == SubmissionStatus::Owned)
        .or_else(|| chain.first())
}

/// Fetch the chain for a dedup key, tiers assigned
pub async fn fetch_chain(
    pool: &SqlitePool,
    policy: DedupPolicy,
    key: &DedupKey,
) -> Result<Vec<ChainMember>> {
    let sql = format!(
        "SELECT s.guid, s.user_id, u.name, u.email, s.status, s.created_at
         FROM submissions s
         JOIN users u ON u.guid = s.user_id
         WHERE s.{}",
        policy.filter_sql()
    );

    let mut query = sqlx::query_as::<_, (String, String, String, String, String, String)>(&sql)
        .bind(&key.phone_number);
    if policy.uses_project() {
        query = query.bind(&key.project_interest_id);
    }

    let rows = query.fetch_all(pool).await?;

    let rows = rows
        .into_iter()
        .map(|(id, user_id, user_name, user_email, status, created_at)| {
            Ok(ChainRow {
                id,
                user_id,
                user_name,
                user_email,
                status: SubmissionStatus::parse(&status)?,
                created_at,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(assign_tiers(rows))
}

/// Fetch the chain containing a specific submission, returning the chain and
/// that submission's tier within it
pub async fn chain_for_submission(
    pool: &SqlitePool,
    policy: DedupPolicy,
    submission_id: &str,
) -> Result<(Vec<ChainMember>, i64)> {
    let key: Option<(String, String)> = sqlx::query_as(
        "SELECT phone_number, project_interest_id FROM submissions WHERE guid = ?",
    )
    .bind(submission_id)
    .fetch_optional(pool)
    .await?;

    let (phone_number, project_interest_id) = key.ok_or_else(|| {
        Error::NotFound(format!("submission {} not found", submission_id))
    })?;

    let chain = fetch_chain(
        pool,
        policy,
        &DedupKey::new(phone_number, project_interest_id),
    )
    .await?;

    let tier = chain
        .iter()
        .find(|member| member.id == submission_id)
        .map(|member| member.tier)
        .unwrap_or(1);

    Ok((chain, tier))
}
