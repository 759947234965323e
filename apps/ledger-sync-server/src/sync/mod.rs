//! Incremental sync
//!
//! Offline clients pull deltas of a collection by replaying the `last_sync`
//! watermark from their previous response as `sync_from`.
//!
//! # Protocol
//!
//! 1. Client requests a listing, optionally with `sync_from`
//! 2. Server captures `now` as the watermark
//! 3. Server filters to `updated_at >= sync_from` and paginates
//! 4. Client stores `last_sync` and sends it as the next `sync_from`
//!
//! Rows committed between steps 2 and 3 may be delivered twice. No row is
//! ever skipped, so clients must apply deltas idempotently.

mod builder;
mod query;
mod types;

pub use builder::{apply_sync, UPDATED_AT};
pub use query::CollectionQuery;
pub use types::{Page, RawSyncQuery, SyncEnvelope, SyncQueryParams, DEFAULT_LIMIT};
