use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    errors::Result,
    kv::KvStore,
    utils::{Clock, SystemClock},
};

struct Entry {
    value: Value,
    expires_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    values: HashMap<String, Entry>,
    sets: HashMap<String, BTreeSet<String>>,
}

/// Process-local store for running without Redis and for tests.
///
/// Expiry is evaluated lazily against the store's clock, so tests that move the clock see
/// records disappear exactly when Redis would drop them.
pub struct MemoryStore {
    state: RwLock<State>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(State::default()),
            clock,
        }
    }

    fn is_live(entry: &Entry, now: DateTime<Utc>) -> bool {
        entry.expires_at.map_or(true, |at| at > now)
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let now = self.clock.now();
        let state = self.state.read().await;

        Ok(state
            .values
            .get(key)
            .filter(|entry| Self::is_live(entry, now))
            .map(|entry| entry.value.clone()))
    }

    async fn set(&self, key: &str, value: Value, expire_after: Option<u64>) -> Result<()> {
        let now = self.clock.now();
        let expires_at = expire_after.map(|secs| now + Duration::seconds(secs as i64));
        let mut state = self.state.write().await;

        // Expired entries are only hidden by reads; writes sweep them out.
        state.values.retain(|_, entry| Self::is_live(entry, now));
        state
            .values
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state.values.remove(key);
        state.sets.remove(key);
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        let mut state = self.state.write().await;
        state
            .sets
            .entry(key.to_string())
            .or_default()
            .insert(member.to_string());
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        let mut state = self.state.write().await;
        if let Some(set) = state.sets.get_mut(key) {
            set.remove(member);
            if set.is_empty() {
                state.sets.remove(key);
            }
        }
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .sets
            .get(key)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
