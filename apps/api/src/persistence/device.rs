//! Device-local key/value storage: theme, per-day caches, timetable image,
//! syllabus checklist and wallet. Backed by Redis.
//!
//! Everything here is best-effort. Most callers go through `remember`,
//! which logs and drops failures; only timetable upload and shop purchases
//! surface them.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{info, warn};

const KEY_PREFIX: &str = "careeros";

/// How long per-day caches (briefing, trends, language session) live.
pub const DAILY_CACHE_TTL: Duration = Duration::from_secs(48 * 60 * 60);

#[derive(Debug, Error)]
pub enum DeviceStoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("value of {size} bytes exceeds the {limit} byte storage quota")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait DeviceStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, DeviceStoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), DeviceStoreError>;

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), DeviceStoreError>;

    async fn delete(&self, key: &str) -> Result<(), DeviceStoreError>;
}

impl dyn DeviceStore + '_ {
    /// Reads and decodes a JSON value. Undecodable values read as absent.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, DeviceStoreError> {
        let Some(raw) = self.get(key).await? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Discarding undecodable device value at {key}: {e}");
                Ok(None)
            }
        }
    }

    pub async fn set_json<T: Serialize + Sync>(
        &self,
        key: &str,
        value: &T,
        ttl: Option<Duration>,
    ) -> Result<(), DeviceStoreError> {
        let raw = serde_json::to_string(value)?;
        match ttl {
            Some(ttl) => self.set_with_ttl(key, &raw, ttl).await,
            None => self.set(key, &raw).await,
        }
    }

    /// Fire-and-forget write: failures (quota included) are logged only.
    pub async fn remember<T: Serialize + Sync>(&self, key: &str, value: &T, ttl: Option<Duration>) {
        if let Err(e) = self.set_json(key, value, ttl).await {
            warn!("Dropped device write to {key}: {e}");
        }
    }
}

/// `careeros:{user}:{slot}`
pub fn device_key(username_key: &str, slot: &str) -> String {
    format!("{KEY_PREFIX}:{username_key}:{slot}")
}

/// `careeros:{user}:{slot}:{YYYY-MM-DD}`, for values regenerated daily.
pub fn daily_key(username_key: &str, slot: &str, date: NaiveDate) -> String {
    format!("{KEY_PREFIX}:{username_key}:{slot}:{}", date.format("%Y-%m-%d"))
}

/// Redis-backed device store with a per-value size quota.
#[derive(Clone)]
pub struct RedisDeviceStore {
    connection: MultiplexedConnection,
    max_value_bytes: usize,
}

impl RedisDeviceStore {
    pub async fn connect(
        client: &redis::Client,
        max_value_bytes: usize,
    ) -> Result<Self, DeviceStoreError> {
        let connection = client.get_multiplexed_tokio_connection().await?;
        info!("Redis device store connected (quota {max_value_bytes} bytes per value)");
        Ok(Self {
            connection,
            max_value_bytes,
        })
    }

    fn check_quota(&self, value: &str) -> Result<(), DeviceStoreError> {
        if value.len() > self.max_value_bytes {
            return Err(DeviceStoreError::QuotaExceeded {
                size: value.len(),
                limit: self.max_value_bytes,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl DeviceStore for RedisDeviceStore {
    async fn get(&self, key: &str) -> Result<Option<String>, DeviceStoreError> {
        let mut conn = self.connection.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), DeviceStoreError> {
        self.check_quota(value)?;
        let mut conn = self.connection.clone();
        conn.set::<_, _, ()>(key, value).await?;
        Ok(())
    }

    async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), DeviceStoreError> {
        self.check_quota(value)?;
        let mut conn = self.connection.clone();
        conn.set_ex::<_, _, ()>(key, value, ttl.as_secs()).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), DeviceStoreError> {
        let mut conn = self.connection.clone();
        conn.del::<_, ()>(key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;

    use super::*;
    use crate::persistence::memory::MemoryDeviceStore;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        n: u32,
    }

    #[test]
    fn test_daily_key_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        assert_eq!(
            daily_key("bob", "briefing", date),
            "careeros:bob:briefing:2026-10-18"
        );
        assert_eq!(device_key("bob", "theme"), "careeros:bob:theme");
    }

    #[tokio::test]
    async fn test_json_helpers_roundtrip_and_tolerate_garbage() {
        let store: Arc<dyn DeviceStore> = Arc::new(MemoryDeviceStore::default());
        store.set_json("k", &Sample { n: 7 }, None).await.unwrap();
        assert_eq!(store.get_json::<Sample>("k").await.unwrap(), Some(Sample { n: 7 }));

        store.set("k", "not json").await.unwrap();
        assert_eq!(store.get_json::<Sample>("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_remember_drops_quota_errors() {
        let store: Arc<dyn DeviceStore> = Arc::new(MemoryDeviceStore::with_limit(4));
        store.remember("k", &"far too long", None).await;
        assert_eq!(store.get("k").await.unwrap(), None);
    }
}
