//! Sync query builder

use chrono::Utc;
use chrono_tz::Tz;

use super::query::CollectionQuery;
use super::types::{SyncEnvelope, SyncQueryParams};
use crate::datetime;
use crate::error::Result;

/// Column every syncable collection tracks changes with
pub const UPDATED_AT: &str = "updated_at";

/// Apply the sync parameters to `query` and wrap the page in a sync envelope.
///
/// The watermark is read before the query is narrowed or executed. A
/// malformed `sync_from` fails the whole call rather than falling back to a
/// full listing.
pub async fn apply_sync<Q: CollectionQuery>(
    params: &SyncQueryParams,
    mut query: Q,
    timezone: Option<Tz>,
) -> Result<SyncEnvelope<Q::Item>> {
    let last_synced = Utc::now();

    if let Some(sync_from) = params.sync_from.as_deref() {
        let since = datetime::normalize(sync_from, timezone)?;
        tracing::debug!("Syncing changes since {} (client sent {:?})", since, sync_from);
        query.add_greater_or_equal_filter(UPDATED_AT, since);
    }

    let page = query.paginate(params.limit, params.page).await?;

    Ok(SyncEnvelope::new(page, last_synced))
}
