//! Persistence adapter: the per-user profile document store and the
//! device-local key/value store.
//!
//! Both sit behind traits so the workspace and feature modules never see
//! PostgreSQL or Redis directly.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::models::profile::{ProfileDocument, ProfilePatch};

pub mod device;
#[cfg(test)]
pub mod memory;
pub mod postgres;
pub mod profile;

/// PostgreSQL SQLSTATE for `insufficient_privilege`.
const PG_INSUFFICIENT_PRIVILEGE: &str = "42501";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("the profile store denied access")]
    PermissionDenied,

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("stored profile is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        let denied = err
            .as_database_error()
            .and_then(|db| db.code())
            .is_some_and(|code| code == PG_INSUFFICIENT_PRIVILEGE);
        if denied {
            StoreError::PermissionDenied
        } else {
            StoreError::Database(err)
        }
    }
}

/// One JSON document per normalized username.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn fetch(&self, key: &str) -> Result<Option<ProfileDocument>, StoreError>;

    async fn create(&self, key: &str, document: &ProfileDocument) -> Result<(), StoreError>;

    /// Top-level field merge: fields present in `patch` overwrite, the rest
    /// are left alone. `last_active` is always written.
    async fn merge(
        &self,
        key: &str,
        patch: &ProfilePatch,
        last_active: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Lowercases, trims and replaces whitespace runs with `_`.
///
/// Identity is whatever name is entered; this only makes "Alice" and
/// " alice " land on the same document.
pub fn normalize_username(raw: &str) -> Result<String, StoreError> {
    let key = raw
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_");
    if key.is_empty() {
        return Err(StoreError::InvalidUsername(
            "username cannot be empty".to_string(),
        ));
    }
    Ok(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_is_case_and_whitespace_insensitive() {
        assert_eq!(normalize_username("Alice").unwrap(), "alice");
        assert_eq!(normalize_username(" alice ").unwrap(), "alice");
    }

    #[test]
    fn test_normalize_replaces_inner_spaces() {
        assert_eq!(normalize_username("Mary  Jane").unwrap(), "mary_jane");
        assert_eq!(normalize_username("Mary\tJane Doe").unwrap(), "mary_jane_doe");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_username("  Bob The Builder ").unwrap();
        let twice = normalize_username(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_normalize_rejects_blank() {
        assert!(matches!(
            normalize_username("   "),
            Err(StoreError::InvalidUsername(_))
        ));
    }
}
