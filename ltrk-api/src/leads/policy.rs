//! Duplicate-detection policy
//!
//! The policy is a tagged value chosen once when application state is built
//! and threaded through ingestion, chain resolution, and classification - it
//! is never re-derived per endpoint. The canonical policy keys on phone
//! number AND project interest; the phone-only variant exists because some
//! deployments treat a phone number as globally unique across projects.

use serde::{Deserialize, Serialize};

/// The pair of values a submission is deduplicated on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey {
    pub phone_number: String,
    pub project_interest_id: String,
}

impl DedupKey {
    pub fn new(phone_number: impl Into<String>, project_interest_id: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            project_interest_id: project_interest_id.into(),
        }
    }
}

/// How submissions are grouped into duplicate chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DedupPolicy {
    /// Canonical: (phone_number, project_interest) is the dedup key
    PhoneAndProject,
    /// Legacy variant: phone number alone groups submissions
    PhoneOnly,
}

impl Default for DedupPolicy {
    fn default() -> Self {
        DedupPolicy::PhoneAndProject
    }
}

impl DedupPolicy {
    /// SQL fragment matching chain members of a key, for use in WHERE clauses
    /// over the submissions table. Bind `phone_number` first, then
    /// `project_interest_id` iff [`Self::uses_project`].
    pub fn filter_sql(&self) -> &'static str {
        match self {
            DedupPolicy::PhoneAndProject => "phone_number = ? AND project_interest_id = ?",
            DedupPolicy::PhoneOnly => "phone_number = ?",
        }
    }

    /// Whether the project half of the key participates in matching
    pub fn uses_project(&self) -> bool {
        matches!(self, DedupPolicy::PhoneAndProject)
    }

    /// Serialization-lock key for a dedup key under this policy. Two keys
    /// that this policy considers the same chain must map to the same string.
    pub fn lock_key(&self, key: &DedupKey) -> String {
        match self {
            DedupPolicy::PhoneAndProject => {
                format!("{}|{}", key.phone_number, key.project_interest_id)
            }
            DedupPolicy::PhoneOnly => key.phone_number.clone(),
        }
    }
}
