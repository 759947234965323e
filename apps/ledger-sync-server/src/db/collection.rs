//! SQLite-backed collection queries
//!
//! Rows are rendered to JSON by SQLite itself (`json_object`), so one query
//! type serves every syncable table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::datetime::format_storage;
use crate::error::{AppError, Result};
use crate::sync::{CollectionQuery, Page};

/// A syncable collection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Wallets,
    Transactions,
    Reminders,
}

impl ResourceKind {
    pub fn table(&self) -> &'static str {
        match self {
            ResourceKind::Wallets => "wallets",
            ResourceKind::Transactions => "transactions",
            ResourceKind::Reminders => "reminders",
        }
    }

    /// Columns exposed to clients, in output order
    fn columns(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Wallets => &[
                "id",
                "client_id",
                "name",
                "currency",
                "balance",
                "created_at",
                "updated_at",
            ],
            ResourceKind::Transactions => &[
                "id",
                "client_id",
                "wallet_id",
                "amount",
                "description",
                "occurred_at",
                "created_at",
                "updated_at",
            ],
            ResourceKind::Reminders => &[
                "id",
                "client_id",
                "title",
                "due_at",
                "created_at",
                "updated_at",
            ],
        }
    }

    /// Timestamp columns that accept range filters
    fn timestamp_columns(&self) -> &'static [&'static str] {
        match self {
            ResourceKind::Wallets => &["created_at", "updated_at"],
            ResourceKind::Transactions => &["occurred_at", "created_at", "updated_at"],
            ResourceKind::Reminders => &["due_at", "created_at", "updated_at"],
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Comparison {
    GreaterOrEqual,
    LessOrEqual,
}

impl Comparison {
    fn sql(&self) -> &'static str {
        match self {
            Comparison::GreaterOrEqual => ">=",
            Comparison::LessOrEqual => "<=",
        }
    }
}

#[derive(Debug, Clone)]
struct Filter {
    field: String,
    comparison: Comparison,
    /// Storage-formatted timestamp
    value: String,
}

/// A user-scoped listing of one collection
pub struct SqliteCollection<'a> {
    pool: &'a SqlitePool,
    kind: ResourceKind,
    user_id: String,
    include_client_id: bool,
    filters: Vec<Filter>,
}

impl<'a> SqliteCollection<'a> {
    pub fn new(pool: &'a SqlitePool, kind: ResourceKind, user_id: &str) -> Self {
        Self {
            pool,
            kind,
            user_id: user_id.to_string(),
            include_client_id: true,
            filters: Vec::new(),
        }
    }

    /// Omit `client_id` from every row when `include` is false
    pub fn include_client_id(mut self, include: bool) -> Self {
        self.include_client_id = include;
        self
    }

    /// Bound `field` to `[from, to]` using storage-formatted timestamps.
    /// Either side may be absent.
    pub fn within(mut self, field: &str, from: Option<String>, to: Option<String>) -> Self {
        if let Some(from) = from {
            self.push_filter(field, Comparison::GreaterOrEqual, from);
        }
        if let Some(to) = to {
            self.push_filter(field, Comparison::LessOrEqual, to);
        }
        self
    }

    fn push_filter(&mut self, field: &str, comparison: Comparison, value: String) {
        self.filters.push(Filter {
            field: field.to_string(),
            comparison,
            value,
        });
    }

    fn select_list(&self) -> String {
        let pairs: Vec<String> = self
            .kind
            .columns()
            .iter()
            .filter(|c| self.include_client_id || **c != "client_id")
            .map(|c| format!("'{c}', {c}"))
            .collect();
        format!("json_object({})", pairs.join(", "))
    }

    fn push_where(&self, builder: &mut QueryBuilder<'_, Sqlite>) -> Result<()> {
        builder.push(" WHERE user_id = ");
        builder.push_bind(self.user_id.clone());

        for filter in &self.filters {
            let column = self
                .kind
                .timestamp_columns()
                .iter()
                .find(|c| **c == filter.field)
                .ok_or_else(|| {
                    AppError::Internal(format!(
                        "cannot filter {} on {}",
                        self.kind.table(),
                        filter.field
                    ))
                })?;

            builder.push(format!(" AND {} {} ", column, filter.comparison.sql()));
            builder.push_bind(filter.value.clone());
        }

        Ok(())
    }

    async fn count(&self) -> Result<u64> {
        let mut builder = QueryBuilder::new(format!("SELECT COUNT(*) FROM {}", self.kind.table()));
        self.push_where(&mut builder)?;

        let (count,): (i64,) = builder.build_query_as().fetch_one(self.pool).await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl CollectionQuery for SqliteCollection<'_> {
    type Item = serde_json::Value;

    fn add_greater_or_equal_filter(&mut self, field: &str, value: DateTime<Utc>) {
        self.push_filter(field, Comparison::GreaterOrEqual, format_storage(value));
    }

    async fn paginate(self, per_page: u32, page: u32) -> Result<Page<Self::Item>> {
        let total = self.count().await?;
        let offset = u64::from(page.saturating_sub(1)) * u64::from(per_page);

        let mut builder = QueryBuilder::new(format!(
            "SELECT {} AS body FROM {}",
            self.select_list(),
            self.kind.table()
        ));
        self.push_where(&mut builder)?;
        builder.push(" ORDER BY updated_at ASC, id ASC LIMIT ");
        builder.push_bind(i64::from(per_page));
        builder.push(" OFFSET ");
        builder.push_bind(offset as i64);

        let rows: Vec<(String,)> = builder.build_query_as().fetch_all(self.pool).await?;
        let items = rows
            .into_iter()
            .map(|(body,)| {
                serde_json::from_str(&body).map_err(|e| {
                    AppError::Internal(format!("invalid row JSON in {}: {}", self.kind.table(), e))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::debug!(
            "Fetched {} of {} rows from {} (page {})",
            items.len(),
            total,
            self.kind.table(),
            page
        );

        Ok(Page {
            items,
            current_page: page,
            per_page,
            total,
        })
    }
}
