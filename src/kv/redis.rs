use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands, Client};
use serde_json::Value;

use crate::{errors::Result, kv::KvStore};

/// Redis-backed store. Values are stored as JSON strings, sets as native Redis sets.
#[derive(Clone)]
pub struct RedisStore {
    connection_manager: ConnectionManager,
}

impl RedisStore {
    pub async fn new(redis_url: &str) -> Result<Self> {
        let client = Client::open(redis_url)?;
        let connection_manager = ConnectionManager::new(client).await?;

        Ok(Self { connection_manager })
    }

    fn connection(&self) -> ConnectionManager {
        self.connection_manager.clone()
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Value>> {
        let mut conn = self.connection();
        let raw: Option<String> = conn.get(key).await?;

        match raw {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: Value, expire_after: Option<u64>) -> Result<()> {
        let mut conn = self.connection();
        let payload = serde_json::to_string(&value)?;

        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(payload);
        if let Some(seconds) = expire_after {
            cmd.arg("EX").arg(seconds);
        }
        cmd.query_async::<_, ()>(&mut conn).await?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.connection();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }

    async fn set_add(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.connection();
        conn.sadd::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn set_remove(&self, key: &str, member: &str) -> Result<()> {
        let mut conn = self.connection();
        conn.srem::<_, _, ()>(key, member).await?;
        Ok(())
    }

    async fn set_members(&self, key: &str) -> Result<Vec<String>> {
        let mut conn = self.connection();
        let members: Vec<String> = conn.smembers(key).await?;
        Ok(members)
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection();
        redis::cmd("PING").query_async::<_, String>(&mut conn).await?;
        Ok(())
    }
}
