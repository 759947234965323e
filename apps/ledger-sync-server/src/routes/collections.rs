//! Incremental listing endpoints for the syncable collections

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::Value;

use crate::context::RequestContext;
use crate::datetime::to_storage_string;
use crate::db::{ResourceKind, SqliteCollection};
use crate::error::Result;
use crate::state::AppState;
use crate::sync::{apply_sync, RawSyncQuery, SyncEnvelope, SyncQueryParams};

/// Create the collections router
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wallets", get(list_wallets))
        .route("/transactions", get(list_transactions))
        .route("/reminders", get(list_reminders))
}

/// Optional date window for transactions. Unparseable bounds are ignored.
#[derive(Debug, Default, Deserialize)]
struct DateWindow {
    date_from: Option<String>,
    date_to: Option<String>,
}

async fn list_wallets(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(raw): Query<RawSyncQuery>,
) -> Result<Json<SyncEnvelope<Value>>> {
    sync_collection(&state, &ctx, raw, ResourceKind::Wallets, DateWindow::default()).await
}

async fn list_transactions(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(raw): Query<RawSyncQuery>,
    Query(window): Query<DateWindow>,
) -> Result<Json<SyncEnvelope<Value>>> {
    sync_collection(&state, &ctx, raw, ResourceKind::Transactions, window).await
}

async fn list_reminders(
    State(state): State<AppState>,
    ctx: RequestContext,
    Query(raw): Query<RawSyncQuery>,
) -> Result<Json<SyncEnvelope<Value>>> {
    sync_collection(&state, &ctx, raw, ResourceKind::Reminders, DateWindow::default()).await
}

async fn sync_collection(
    state: &AppState,
    ctx: &RequestContext,
    raw: RawSyncQuery,
    kind: ResourceKind,
    window: DateWindow,
) -> Result<Json<SyncEnvelope<Value>>> {
    let principal = ctx.require_principal()?;
    let params = SyncQueryParams::from_query(raw, state.config().sync.default_limit)?;

    let mut query = SqliteCollection::new(state.db(), kind, &principal.user_id)
        .include_client_id(params.include_client_id());

    if window.date_from.is_some() || window.date_to.is_some() {
        query = query.within(
            "occurred_at",
            to_storage_string(window.date_from.as_deref(), ctx.timezone()),
            to_storage_string(window.date_to.as_deref(), ctx.timezone()),
        );
    }

    let envelope = apply_sync(&params, query, ctx.timezone()).await?;
    Ok(Json(envelope))
}
