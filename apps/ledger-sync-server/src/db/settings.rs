//! Per-user settings persistence

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::context::UserConfig;
use crate::datetime::format_storage;
use crate::error::Result;

pub const TIMEZONE_KEY: &str = "timezone";
pub const LANGUAGE_KEY: &str = "language";

/// The settings a client can read and change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    pub timezone: Option<String>,
    pub language: Option<String>,
}

/// Settings repository, scoped to one user
pub struct SettingsRepository<'a> {
    pool: &'a SqlitePool,
    user_id: &'a str,
}

impl<'a> SettingsRepository<'a> {
    pub fn new(pool: &'a SqlitePool, user_id: &'a str) -> Self {
        Self { pool, user_id }
    }

    /// Get a single setting
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT value FROM user_settings WHERE user_id = ? AND key = ?")
                .bind(self.user_id)
                .bind(key)
                .fetch_optional(self.pool)
                .await?;

        Ok(row.map(|(v,)| v))
    }

    /// Set or clear a single setting
    pub async fn set(&self, key: &str, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => {
                sqlx::query(
                    r#"
                    INSERT INTO user_settings (user_id, key, value, updated_at)
                    VALUES (?, ?, ?, ?)
                    ON CONFLICT(user_id, key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at
                    "#,
                )
                .bind(self.user_id)
                .bind(key)
                .bind(value)
                .bind(format_storage(Utc::now()))
                .execute(self.pool)
                .await?;
            }
            None => {
                sqlx::query("DELETE FROM user_settings WHERE user_id = ? AND key = ?")
                    .bind(self.user_id)
                    .bind(key)
                    .execute(self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    /// Get the client-visible settings
    pub async fn load(&self) -> Result<UserSettings> {
        Ok(UserSettings {
            timezone: self.get(TIMEZONE_KEY).await?,
            language: self.get(LANGUAGE_KEY).await?,
        })
    }
}

#[async_trait]
impl UserConfig for SettingsRepository<'_> {
    async fn config_value(&self, key: &str) -> Result<Option<String>> {
        self.get(key).await
    }
}
