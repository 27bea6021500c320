//! Hot-lead classification
//!
//! A dedup-key group is hot once enough distinct marketers have submitted the
//! same contact. The flag is a group-level property mirrored onto every row
//! for query simplicity, so the hot-leads listing is a plain indexed read.
//! Classification runs synchronously after every write that can change the
//! group's submitter set (ingestion, override).

use sqlx::SqlitePool;
use tracing::info;

use ltrk_common::time;
use ltrk_common::Result;

use crate::leads::policy::{DedupKey, DedupPolicy};

/// Distinct submitters required before a group is flagged hot
pub const HOT_LEAD_THRESHOLD: i64 = 3;

/// Recompute the hot-lead flag for one dedup-key group
///
/// The count and the mirror write cover the whole group in one UPDATE, so
/// rows in the same chain can never disagree about the flag.
pub async fn recompute_hot_lead(
    pool: &SqlitePool,
    policy: DedupPolicy,
    key: &DedupKey,
) -> Result<bool> {
    let count_sql = format!(
        "SELECT COUNT(DISTINCT user_id) FROM submissions WHERE {}",
        policy.filter_sql()
    );
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(&key.phone_number);
    if policy.uses_project() {
        count_query = count_query.bind(&key.project_interest_id);
    }
    let distinct_submitters = count_query.fetch_one(pool).await?;

    let hot = distinct_submitters >= HOT_LEAD_THRESHOLD;

    let update_sql = format!(
        "UPDATE submissions SET is_hot_lead = ?, updated_at = ? WHERE {} AND is_hot_lead != ?",
        policy.filter_sql()
    );
    let mut update_query = sqlx::query(&update_sql)
        .bind(hot as i64)
        .bind(time::now_rfc3339())
        .bind(&key.phone_number);
    if policy.uses_project() {
        update_query = update_query.bind(&key.project_interest_id);
    }
    update_query = update_query.bind(hot as i64);
    let result = update_query.execute(pool).await?;

    if hot && result.rows_affected() > 0 {
        info!(
            "Lead group for phone {} reached {} distinct submitters, flagged hot",
            key.phone_number, distinct_submitters
        );
    }

    Ok(hot)
}
