//! Lead decision logic
//!
//! Everything with actual state transitions lives here: submission ingestion
//! (duplicate detection, ownership assignment), chain resolution and tier
//! computation, hot-lead classification, and the admin ownership override.
//! HTTP concerns stay in `crate::api`; this module speaks models and errors.

use ltrk_common::db::models::{Submission, SubmissionStatus};
use ltrk_common::{Error, Result};
use sqlx::SqlitePool;

pub mod chain;
pub mod hot_lead;
pub mod ingest;
pub mod locks;
pub mod ownership;
pub mod policy;

/// Columns fetched for a full submission model, in field order
const SUBMISSION_COLUMNS: &str = "guid, user_id, name, phone_number, project_interest_id, notes, \
     status, follow_up_status, is_hot_lead, original_submission_id, \
     ownership_expires_at, created_at, updated_at";

type SubmissionRow = (
    String,         // guid
    String,         // user_id
    String,         // name
    String,         // phone_number
    String,         // project_interest_id
    Option<String>, // notes
    String,         // status
    Option<String>, // follow_up_status
    i64,            // is_hot_lead
    Option<String>, // original_submission_id
    Option<String>, // ownership_expires_at
    String,         // created_at
    String,         // updated_at
);

fn submission_from_row(row: SubmissionRow) -> Result<Submission> {
    Ok(Submission {
        guid: row.0,
        user_id: row.1,
        name: row.2,
        phone_number: row.3,
        project_interest_id: row.4,
        notes: row.5,
        status: SubmissionStatus::parse(&row.6)?,
        follow_up_status: row.7,
        is_hot_lead: row.8 != 0,
        original_submission_id: row.9,
        ownership_expires_at: row.10,
        created_at: row.11,
        updated_at: row.12,
    })
}

/// Fetch one submission by guid
pub async fn fetch_submission(pool: &SqlitePool, guid: &str) -> Result<Submission> {
    let sql = format!("SELECT {} FROM submissions WHERE guid = ?", SUBMISSION_COLUMNS);
    let row: Option<SubmissionRow> = sqlx::query_as(&sql).bind(guid).fetch_optional(pool).await?;

    match row {
        Some(row) => submission_from_row(row),
        None => Err(Error::NotFound(format!("submission {} not found", guid))),
    }
}
