//! Configuration management for the Ledger sync server

use std::env;

use serde::Deserialize;

use crate::locale::{Locale, SUPPORTED_LOCALES};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub locale: LocaleConfig,
    pub sync: SyncConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocaleConfig {
    /// Locale used when negotiation finds nothing better
    pub default: Locale,
    pub supported: Vec<Locale>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// Page size when the client sends no `limit`
    pub default_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "sqlite:./ledger.db".to_string(),
            },
            locale: LocaleConfig {
                default: Locale::En,
                supported: SUPPORTED_LOCALES.to_vec(),
            },
            sync: SyncConfig { default_limit: 20 },
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        let default_locale = match env::var("APP_LOCALE") {
            Ok(tag) => tag.parse().unwrap_or_else(|e| {
                tracing::warn!("{}, falling back to {}", e, Locale::En);
                Locale::En
            }),
            Err(env::VarError::NotPresent) => Locale::En,
            Err(e) => return Err(e),
        };

        Ok(Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()
                    .unwrap_or(3000),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:./ledger.db".to_string()),
            },
            locale: LocaleConfig {
                default: default_locale,
                supported: SUPPORTED_LOCALES.to_vec(),
            },
            sync: SyncConfig {
                default_limit: env::var("SYNC_DEFAULT_LIMIT")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .filter(|limit| *limit > 0)
                    .unwrap_or(20),
            },
        })
    }
}
