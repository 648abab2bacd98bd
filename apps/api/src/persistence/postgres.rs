use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use crate::models::profile::{ProfileDocument, ProfilePatch};
use crate::persistence::{ProfileStore, StoreError};

/// Profile documents in the `profiles` table, one JSONB row per username key.
#[derive(Clone)]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, key: &str) -> Result<Option<ProfileDocument>, StoreError> {
        let row: Option<Value> =
            sqlx::query_scalar("SELECT document FROM profiles WHERE username_key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(document) => Ok(Some(serde_json::from_value(document)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, key: &str, document: &ProfileDocument) -> Result<(), StoreError> {
        let value = serde_json::to_value(document)?;
        sqlx::query(
            r#"
            INSERT INTO profiles (username_key, document)
            VALUES ($1, $2)
            ON CONFLICT (username_key) DO UPDATE
                SET document = EXCLUDED.document, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await?;

        debug!("Created profile document for {key}");
        Ok(())
    }

    async fn merge(
        &self,
        key: &str,
        patch: &ProfilePatch,
        last_active: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut value = serde_json::to_value(patch)?;
        if let Value::Object(fields) = &mut value {
            fields.insert("lastActive".to_string(), serde_json::to_value(last_active)?);
        }

        // `||` on jsonb replaces top-level keys wholesale, which is the
        // whole-field overwrite contract of the profile store.
        sqlx::query(
            r#"
            INSERT INTO profiles (username_key, document)
            VALUES ($1, $2)
            ON CONFLICT (username_key) DO UPDATE
                SET document = profiles.document || EXCLUDED.document, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(&value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
