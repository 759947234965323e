//! Collection query abstraction

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::types::Page;
use crate::error::Result;

/// A listing query the sync builder can narrow and paginate.
///
/// Implemented by whatever storage component owns the collection. The sync
/// builder never sees the concrete store.
#[async_trait]
pub trait CollectionQuery: Send + Sized {
    type Item: Send;

    /// Keep only rows where `field >= value`
    fn add_greater_or_equal_filter(&mut self, field: &str, value: DateTime<Utc>);

    /// Run the query and return one page of results
    async fn paginate(self, per_page: u32, page: u32) -> Result<Page<Self::Item>>;
}
