//! Submission ingestion
//!
//! Accepts a new lead, determines its duplicate relationship to the existing
//! chain for its dedup key, assigns status and ownership, and re-evaluates
//! the group's hot-lead flag. The read-decide-insert sequence runs under the
//! per-key lock; the partial unique owner index catches writers this process
//! never saw, in which case the chain is re-read once and the decision redone.

use sqlx::SqlitePool;
use tracing::{info, warn};

use ltrk_common::db::models::{new_guid, Submission, SubmissionStatus};
use ltrk_common::time;
use ltrk_common::{Error, Result};

use crate::leads::chain::{fetch_chain, ChainMember};
use crate::leads::hot_lead::recompute_hot_lead;
use crate::leads::locks::KeyLocks;
use crate::leads::ownership::{expire_lapsed_ownership_for_key, OWNERSHIP_TERM_DAYS};
use crate::leads::policy::{DedupKey, DedupPolicy};

/// Input contract for a new lead submission
#[derive(Debug, Clone)]
pub struct NewLead {
    pub name: String,
    pub phone_number: String,
    pub project_interest_id: String,
    pub notes: Option<String>,
}

/// Ingest a new lead submission for `submitter_id`
///
/// Empty chain: the submission becomes tier 1 with status `owned`. Non-empty
/// chain: rejected with `Conflict` when the submitter already holds the
/// `owned` row for this key, otherwise accepted as `duplicate` with a
/// back-reference to the chain's tier-1 row.
pub async fn create_submission(
    pool: &SqlitePool,
    policy: DedupPolicy,
    locks: &KeyLocks,
    submitter_id: &str,
    lead: NewLead,
) -> Result<Submission> {
    let name = lead.name.trim();
    let phone_number = lead.phone_number.trim();
    let project_interest_id = lead.project_interest_id.trim();

    if name.is_empty() || phone_number.is_empty() || project_interest_id.is_empty() {
        return Err(Error::Validation(
            "name, phone number, and project interest are required".into(),
        ));
    }

    let active: Option<i64> =
        sqlx::query_scalar("SELECT active FROM project_interests WHERE guid = ?")
            .bind(project_interest_id)
            .fetch_optional(pool)
            .await?;
    match active {
        None => {
            return Err(Error::NotFound(format!(
                "project interest {} not found",
                project_interest_id
            )))
        }
        Some(0) => {
            return Err(Error::Validation(
                "project interest is no longer active".into(),
            ))
        }
        Some(_) => {}
    }

    let key = DedupKey::new(phone_number, project_interest_id);

    // Serialize read-decide-insert per dedup key
    let _guard = locks.acquire(&policy.lock_key(&key)).await;

    // Lapsed ownership for this key transitions to expired before the chain
    // is read, so the decision below sees current state
    expire_lapsed_ownership_for_key(pool, policy, &key).await?;

    // One retry: a writer outside this process may win the owner slot between
    // our read and insert; the unique index reports it and we re-read
    for attempt in 0..2 {
        let existing_chain = fetch_chain(pool, policy, &key).await?;

        if existing_chain
            .iter()
            .any(|m| m.user_id == submitter_id && m.status == SubmissionStatus::Owned)
        {
            return Err(Error::Conflict(
                "submitter already owns this lead".into(),
            ));
        }

        match insert_submission(pool, submitter_id, name, &key, lead.notes.as_deref(), &existing_chain).await {
            Ok(guid) => {
                recompute_hot_lead(pool, policy, &key).await?;
                let submission = super::fetch_submission(pool, &guid).await?;
                info!(
                    "Submission {} ingested: status {}, phone {}",
                    submission.guid,
                    submission.status.as_str(),
                    submission.phone_number
                );
                return Ok(submission);
            }
            Err(err) if err.is_unique_violation() && attempt == 0 => {
                warn!(
                    "Lost owner race for phone {}, re-resolving chain",
                    key.phone_number
                );
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    // Both attempts lost the owner slot to concurrent writers
    Err(Error::Conflict("lead ownership already taken".into()))
}

async fn insert_submission(
    pool: &SqlitePool,
    submitter_id: &str,
    name: &str,
    key: &DedupKey,
    notes: Option<&str>,
    existing_chain: &[ChainMember],
) -> Result<String> {
    let guid = new_guid();
    let now = time::now_rfc3339();

    let (status, original_submission_id, ownership_expires_at) = if existing_chain.is_empty() {
        (
            SubmissionStatus::Owned,
            None,
            Some(time::days_from_now_rfc3339(OWNERSHIP_TERM_DAYS)),
        )
    } else {
        (
            SubmissionStatus::Duplicate,
            Some(existing_chain[0].id.clone()),
            None,
        )
    };

    sqlx::query(
        r#"
        INSERT INTO submissions
            (guid, user_id, name, phone_number, project_interest_id, notes,
             status, is_hot_lead, original_submission_id, ownership_expires_at,
             created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?, ?, ?, ?)
        "#,
    )
    .bind(&guid)
    .bind(submitter_id)
    .bind(name)
    .bind(&key.phone_number)
    .bind(&key.project_interest_id)
    .bind(notes)
    .bind(status.as_str())
    .bind(original_submission_id)
    .bind(ownership_expires_at)
    .bind(&now)
    .bind(&now)
    .execute(pool)
    .await?;

    Ok(guid)
}
