//! Ownership override and expiry
//!
//! The admin override bypasses ingestion's conflict checks entirely: it is an
//! authoritative action that reassigns a submission to a new marketer. The
//! ownership update and its audit entry commit in one transaction - an
//! override that cannot be audited does not happen. Ownership also lapses on
//! a timer; lapsed rows transition to `expired` and the owner slot frees up.

use sqlx::SqlitePool;
use tracing::info;

use ltrk_common::db::models::{new_guid, Role, Submission};
use ltrk_common::time;
use ltrk_common::{Error, Result};

use crate::leads::hot_lead::recompute_hot_lead;
use crate::leads::locks::KeyLocks;
use crate::leads::policy::{DedupKey, DedupPolicy};

/// Days an ownership grant lasts before it lapses
pub const OWNERSHIP_TERM_DAYS: i64 = 30;

/// Admin override request
#[derive(Debug, Clone)]
pub struct OverrideRequest {
    pub submission_id: String,
    pub new_owner_id: String,
    pub reason: String,
}

/// Forcibly reassign ownership of a submission
///
/// Verifies the submission exists and the new owner is a marketer, then in
/// one transaction: demotes any other owned row in the dedup group (the
/// one-owner invariant holds through the override), moves the submission to
/// the new owner with a fresh ownership term, and appends the audit entry.
pub async fn override_ownership(
    pool: &SqlitePool,
    policy: DedupPolicy,
    locks: &KeyLocks,
    admin_id: &str,
    request: OverrideRequest,
) -> Result<Submission> {
    let reason = request.reason.trim();
    if reason.is_empty() {
        return Err(Error::Validation("override reason is required".into()));
    }

    let submission = super::fetch_submission(pool, &request.submission_id).await?;

    let new_owner_role: Option<String> =
        sqlx::query_scalar("SELECT role FROM users WHERE guid = ?")
            .bind(&request.new_owner_id)
            .fetch_optional(pool)
            .await?;
    match new_owner_role.as_deref().map(Role::parse).transpose()? {
        Some(Role::Marketer) => {}
        _ => {
            return Err(Error::NotFound(
                "new owner not found or not a marketer".into(),
            ))
        }
    }

    let key = DedupKey::new(
        submission.phone_number.clone(),
        submission.project_interest_id.clone(),
    );
    let _guard = locks.acquire(&policy.lock_key(&key)).await;

    let now = time::now_rfc3339();
    let expires_at = time::days_from_now_rfc3339(OWNERSHIP_TERM_DAYS);

    let mut tx = pool.begin().await?;

    // Demote any sibling owner first so the unique owner index never sees two
    let demote_sql = format!(
        "UPDATE submissions SET status = 'duplicate', updated_at = ? WHERE {} AND status = 'owned' AND guid != ?",
        policy.filter_sql()
    );
    let mut demote = sqlx::query(&demote_sql).bind(&now).bind(&key.phone_number);
    if policy.uses_project() {
        demote = demote.bind(&key.project_interest_id);
    }
    demote = demote.bind(&submission.guid);
    demote.execute(&mut *tx).await?;

    sqlx::query(
        r#"
        UPDATE submissions
        SET user_id = ?, status = 'owned', ownership_expires_at = ?, updated_at = ?
        WHERE guid = ?
        "#,
    )
    .bind(&request.new_owner_id)
    .bind(&expires_at)
    .bind(&now)
    .bind(&submission.guid)
    .execute(&mut *tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO override_logs
            (guid, admin_id, submission_id, old_owner_id, new_owner_id, reason, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new_guid())
    .bind(admin_id)
    .bind(&submission.guid)
    .bind(&submission.user_id)
    .bind(&request.new_owner_id)
    .bind(reason)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    info!(
        "Ownership of submission {} overridden: {} -> {} by admin {}",
        submission.guid, submission.user_id, request.new_owner_id, admin_id
    );

    // The override may have changed the group's distinct-submitter set
    recompute_hot_lead(pool, policy, &key).await?;

    super::fetch_submission(pool, &submission.guid).await
}

/// Expire lapsed ownership within one dedup-key group. Returns rows changed.
pub async fn expire_lapsed_ownership_for_key(
    pool: &SqlitePool,
    policy: DedupPolicy,
    key: &DedupKey,
) -> Result<u64> {
    let sql = format!(
        "UPDATE submissions SET status = 'expired', updated_at = ?
         WHERE {} AND status = 'owned'
           AND ownership_expires_at IS NOT NULL AND ownership_expires_at <= ?",
        policy.filter_sql()
    );
    let now = time::now_rfc3339();
    let mut query = sqlx::query(&sql).bind(&now).bind(&key.phone_number);
    if policy.uses_project() {
        query = query.bind(&key.project_interest_id);
    }
    query = query.bind(&now);
    let result = query.execute(pool).await?;

    Ok(result.rows_affected())
}

/// Expire lapsed ownership across every group (admin maintenance sweep).
/// Returns rows changed.
pub async fn expire_all_lapsed(pool: &SqlitePool) -> Result<u64> {
    let now = time::now_rfc3339();
    let result = sqlx::query(
        "UPDATE submissions SET status = 'expired', updated_at = ?
         WHERE status = 'owned'
           AND ownership_expires_at IS NOT NULL AND ownership_expires_at <= ?",
    )
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    if result.rows_affected() > 0 {
        info!("Expired ownership on {} submissions", result.rows_affected());
    }

    Ok(result.rows_affected())
}
