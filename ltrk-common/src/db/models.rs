//! Database models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// Generate a new row guid (hyphenated lowercase UUIDv4)
pub fn new_guid() -> String {
    Uuid::new_v4().to_string()
}

/// User role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Marketer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Marketer => "marketer",
        }
    }

    pub fn parse(s: &str) -> Result<Role> {
        match s {
            "admin" => Ok(Role::Admin),
            "marketer" => Ok(Role::Marketer),
            other => Err(Error::Internal(format!("unknown role '{}'", other))),
        }
    }
}

/// Submission status
///
/// The canonical stored value for the ownership state is `owned`; the legacy
/// `own` spelling is accepted on read only. Hot-lead is not a status: it is
/// the group-level `is_hot_lead` flag mirrored onto every row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Owned,
    Duplicate,
    Expired,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Owned => "owned",
            SubmissionStatus::Duplicate => "duplicate",
            SubmissionStatus::Expired => "expired",
        }
    }

    pub fn parse(s: &str) -> Result<SubmissionStatus> {
        match s {
            "pending" => Ok(SubmissionStatus::Pending),
            // Legacy alias: older rows may carry 'own'
            "own" | "owned" => Ok(SubmissionStatus::Owned),
            "duplicate" => Ok(SubmissionStatus::Duplicate),
            "expired" => Ok(SubmissionStatus::Expired),
            other => Err(Error::Internal(format!(
                "unknown submission status '{}'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub guid: String,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectInterest {
    pub guid: String,
    pub name: String,
    pub description: Option<String>,
    pub active: bool,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Submission {
    pub guid: String,
    pub user_id: String,
    pub name: String,
    pub phone_number: String,
    pub project_interest_id: String,
    pub notes: Option<String>,
    pub status: SubmissionStatus,
    pub follow_up_status: Option<String>,
    pub is_hot_lead: bool,
    pub original_submission_id: Option<String>,
    pub ownership_expires_at: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverrideLog {
    pub guid: String,
    pub admin_id: String,
    pub submission_id: String,
    pub old_owner_id: String,
    pub new_owner_id: String,
    pub reason: String,
    pub created_at: String,
}
