use std::sync::Arc;

use crate::{
    errors::Result,
    kv::{keys, KvClient},
    models::{RateLimitRecord, RateLimitResult, RemainingGenerations},
    utils::{
        time::{next_midnight_utc, seconds_until},
        Clock,
    },
};

pub const DEFAULT_DAILY_LIMIT: u32 = 5;

/// Storage lifetime of a freshly opened period.
const NEW_PERIOD_TTL_SECS: u64 = 86_400;

/// Per-visitor daily generation quota that resets at the first UTC midnight after first use.
///
/// `check_rate_limit` and `increment_rate_limit` are separate round trips. Two concurrent
/// requests from the same visitor can both pass the check before either increments, so the
/// limit can be overshot by the number of in-flight requests.
#[derive(Clone)]
pub struct RateLimiter {
    kv: KvClient,
    clock: Arc<dyn Clock>,
    daily_limit: u32,
}

impl RateLimiter {
    pub fn new(kv: KvClient, clock: Arc<dyn Clock>, daily_limit: u32) -> Self {
        Self {
            kv,
            clock,
            daily_limit,
        }
    }

    pub fn daily_limit(&self) -> u32 {
        self.daily_limit
    }

    pub async fn check_rate_limit(&self, user_id: &str) -> Result<RateLimitResult> {
        let now = self.clock.now();
        let record: Option<RateLimitRecord> = self.kv.get_json(&keys::rate_limit(user_id)).await?;

        let result = match record {
            Some(record) if record.reset_at > now => {
                let remaining = self.daily_limit.saturating_sub(record.count);
                RateLimitResult {
                    allowed: remaining > 0,
                    remaining,
                    reset_at: record.reset_at,
                }
            }
            // Nothing stored, or the stored period is over even if the key still exists.
            _ => RateLimitResult {
                allowed: true,
                remaining: self.daily_limit,
                reset_at: next_midnight_utc(now),
            },
        };

        if !result.allowed {
            tracing::debug!(user_id, reset_at = %result.reset_at, "Daily generation limit reached");
        }

        Ok(result)
    }

    /// Records one generation. Performs no admission check; call `check_rate_limit` first.
    pub async fn increment_rate_limit(&self, user_id: &str) -> Result<()> {
        let key = keys::rate_limit(user_id);
        let now = self.clock.now();
        let record: Option<RateLimitRecord> = self.kv.get_json(&key).await?;

        let (next, ttl) = match record {
            Some(record) if record.reset_at > now => {
                let ttl = seconds_until(record.reset_at, now);
                (
                    RateLimitRecord {
                        count: record.count.saturating_add(1),
                        reset_at: record.reset_at,
                    },
                    ttl,
                )
            }
            _ => (
                RateLimitRecord {
                    count: 1,
                    reset_at: next_midnight_utc(now),
                },
                NEW_PERIOD_TTL_SECS,
            ),
        };

        tracing::debug!(user_id, count = next.count, ttl, "Recording generation");
        if next.count == self.daily_limit {
            tracing::info!(user_id, reset_at = %next.reset_at, "Visitor used up daily generations");
        }
        self.kv.set_json(&key, &next, Some(ttl)).await
    }

    pub async fn get_remaining_generations(&self, user_id: &str) -> Result<RemainingGenerations> {
        Ok(self.check_rate_limit(user_id).await?.into())
    }
}
