use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::errors::Result;

pub mod keys;
pub mod memory;
pub mod redis;

pub use self::memory::MemoryStore;
pub use self::redis::RedisStore;

/// Minimal key-value surface the services are written against.
///
/// Every call is a single round trip with single-key atomicity and nothing more; callers that
/// read, modify and write a record race against each other.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Stores `value`, replacing any previous value and expiry. `expire_after` is in seconds.
    async fn set(&self, key: &str, value: Value, expire_after: Option<u64>) -> Result<()>;

    async fn delete(&self, key: &str) -> Result<()>;

    async fn set_add(&self, key: &str, member: &str) -> Result<()>;

    async fn set_remove(&self, key: &str, member: &str) -> Result<()>;

    async fn set_members(&self, key: &str) -> Result<Vec<String>>;

    async fn ping(&self) -> Result<()>;
}

/// Cheap-to-clone handle adding typed JSON access on top of a [`KvStore`].
#[derive(Clone)]
pub struct KvClient {
    store: Arc<dyn KvStore>,
}

impl KvClient {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KvStore> {
        &self.store
    }

    pub async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            Some(value) => Ok(Some(serde_json::from_value(value)?)),
            None => Ok(None),
        }
    }

    pub async fn set_json<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
        expire_after: Option<u64>,
    ) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.store.set(key, value, expire_after).await
    }

    pub async fn delete(&self, key: &str) -> Result<()> {
        self.store.delete(key).await
    }

    pub async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        self.store.set_add(key, member).await
    }

    pub async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        self.store.set_remove(key, member).await
    }

    pub async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        self.store.set_members(key).await
    }

    pub async fn ping(&self) -> Result<()> {
        self.store.ping().await
    }
}
