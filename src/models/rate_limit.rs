use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Stored quota usage for one visitor. Logically void once `reset_at` has passed, even if the
/// backing store has not dropped it yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    pub count: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemainingGenerations {
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

impl From<RateLimitResult> for RemainingGenerations {
    fn from(result: RateLimitResult) -> Self {
        Self {
            remaining: result.remaining,
            reset_at: result.reset_at,
        }
    }
}
