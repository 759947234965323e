//! Sync data types
//!
//! Defines the request parameters and the response envelope shared by
//! every incremental listing endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Page size used when the client does not send `limit`
pub const DEFAULT_LIMIT: u32 = 20;

/// Raw query string, before validation
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSyncQuery {
    pub limit: Option<String>,
    pub page: Option<String>,
    pub sync_from: Option<String>,
    pub no_client_id: Option<String>,
}

/// Validated sync parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncQueryParams {
    /// Page size, always positive
    pub limit: u32,
    /// 1-based page number
    pub page: u32,
    /// Only return rows updated at or after this client timestamp
    pub sync_from: Option<String>,
    /// Ask the collection to omit `client_id` from each row
    pub no_client_id: Option<bool>,
}

impl Default for SyncQueryParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            page: 1,
            sync_from: None,
            no_client_id: None,
        }
    }
}

impl SyncQueryParams {
    /// Validate raw query parameters. Empty values count as absent.
    pub fn from_query(raw: RawSyncQuery, default_limit: u32) -> Result<Self> {
        let limit = match non_empty(raw.limit) {
            Some(v) => parse_positive("limit", &v)?,
            None => default_limit,
        };
        let page = match non_empty(raw.page) {
            Some(v) => parse_positive("page", &v)?,
            None => 1,
        };
        let no_client_id = non_empty(raw.no_client_id)
            .map(|v| parse_bool("no_client_id", &v))
            .transpose()?;

        Ok(Self {
            limit,
            page,
            sync_from: non_empty(raw.sync_from),
            no_client_id,
        })
    }

    pub fn include_client_id(&self) -> bool {
        !self.no_client_id.unwrap_or(false)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn parse_positive(name: &str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or_else(|| AppError::invalid_argument(name, value))
}

fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(AppError::invalid_argument(name, value)),
    }
}

/// One page of a collection query
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub current_page: u32,
    pub per_page: u32,
    pub total: u64,
}

impl<T> Page<T> {
    /// Last page number; 1 for an empty collection
    pub fn last_page(&self) -> u64 {
        if self.per_page == 0 {
            return 1;
        }
        self.total.div_ceil(u64::from(self.per_page)).max(1)
    }
}

/// Response body of an incremental listing
#[derive(Debug, Clone, Serialize)]
pub struct SyncEnvelope<T> {
    pub data: Vec<T>,
    /// Server time captured before the query ran; the client's next `sync_from`
    pub last_sync: DateTime<Utc>,
    pub current_page: u32,
    pub total: u64,
    pub per_page: u32,
    pub last_page: u64,
}

impl<T> SyncEnvelope<T> {
    pub fn new(page: Page<T>, last_sync: DateTime<Utc>) -> Self {
        let last_page = page.last_page();
        Self {
            data: page.items,
            last_sync,
            current_page: page.current_page,
            total: page.total,
            per_page: page.per_page,
            last_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(pairs: &[(&str, &str)]) -> RawSyncQuery {
        let mut raw = RawSyncQuery::default();
        for (k, v) in pairs {
            let v = Some(v.to_string());
            match *k {
                "limit" => raw.limit = v,
                "page" => raw.page = v,
                "sync_from" => raw.sync_from = v,
                "no_client_id" => raw.no_client_id = v,
                _ => unreachable!(),
            }
        }
        raw
    }

    #[test]
    fn test_defaults() {
        let params = SyncQueryParams::from_query(RawSyncQuery::default(), DEFAULT_LIMIT).unwrap();
        assert_eq!(params, SyncQueryParams::default());
        assert!(params.include_client_id());
    }

    #[test]
    fn test_configured_default_limit() {
        let params = SyncQueryParams::from_query(RawSyncQuery::default(), 50).unwrap();
        assert_eq!(params.limit, 50);
    }

    #[test]
    fn test_parses_values() {
        let params = SyncQueryParams::from_query(
            raw(&[
                ("limit", "5"),
                ("page", "3"),
                ("sync_from", "2024-01-01T00:00:00Z"),
                ("no_client_id", "true"),
            ]),
            DEFAULT_LIMIT,
        )
        .unwrap();

        assert_eq!(params.limit, 5);
        assert_eq!(params.page, 3);
        assert_eq!(params.sync_from.as_deref(), Some("2024-01-01T00:00:00Z"));
        assert!(!params.include_client_id());
    }

    #[test]
    fn test_empty_values_are_absent() {
        let params = SyncQueryParams::from_query(
            raw(&[("limit", ""), ("sync_from", ""), ("no_client_id", " ")]),
            DEFAULT_LIMIT,
        )
        .unwrap();
        assert_eq!(params, SyncQueryParams::default());
    }

    #[test]
    fn test_rejects_bad_values() {
        for pairs in [
            [("limit", "0")],
            [("limit", "-3")],
            [("limit", "ten")],
            [("page", "0")],
            [("no_client_id", "maybe")],
            [("no_client_id", "yes")],
            [("no_client_id", "on")],
        ] {
            let err = SyncQueryParams::from_query(raw(&pairs), DEFAULT_LIMIT).unwrap_err();
            assert!(matches!(err, AppError::InvalidArgument { .. }));
        }
    }

    #[test]
    fn test_last_page() {
        let page = |total, per_page| Page::<()> {
            items: vec![],
            current_page: 1,
            per_page,
            total,
        };
        assert_eq!(page(0, 20).last_page(), 1);
        assert_eq!(page(20, 20).last_page(), 1);
        assert_eq!(page(21, 20).last_page(), 2);
        assert_eq!(page(45, 20).last_page(), 3);
    }
}
