//! Per-user settings API routes

use axum::{extract::State, routing::get, Json, Router};
use serde::Deserialize;

use crate::context::RequestContext;
use crate::datetime::resolve_timezone;
use crate::db::{SettingsRepository, UserSettings, LANGUAGE_KEY, TIMEZONE_KEY};
use crate::error::{AppError, Result};
use crate::locale::Locale;
use crate::state::AppState;

/// Create the settings router
pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(get_settings).put(update_settings))
}

/// Settings update request.
///
/// A missing field is left unchanged; an explicit `null` clears it.
#[derive(Debug, Deserialize)]
struct SettingsUpdate {
    #[serde(default, deserialize_with = "present")]
    timezone: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    language: Option<Option<String>>,
}

fn present<'de, D>(deserializer: D) -> std::result::Result<Option<Option<String>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

/// Get the caller's settings
async fn get_settings(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<UserSettings>> {
    let principal = ctx.require_principal()?;
    let repo = SettingsRepository::new(state.db(), &principal.user_id);
    Ok(Json(repo.load().await?))
}

/// Update the caller's settings
async fn update_settings(
    State(state): State<AppState>,
    ctx: RequestContext,
    Json(update): Json<SettingsUpdate>,
) -> Result<Json<UserSettings>> {
    let principal = ctx.require_principal()?;

    // Validate everything before writing anything
    if let Some(Some(tz)) = &update.timezone {
        if resolve_timezone(tz).is_none() {
            return Err(AppError::InvalidTimezone(tz.clone()));
        }
    }
    if let Some(Some(language)) = &update.language {
        let supported = language
            .parse::<Locale>()
            .map(|l| state.config().locale.supported.contains(&l))
            .unwrap_or(false);
        if !supported {
            return Err(AppError::UnsupportedLanguage(language.clone()));
        }
    }

    let repo = SettingsRepository::new(state.db(), &principal.user_id);
    if let Some(timezone) = &update.timezone {
        repo.set(TIMEZONE_KEY, timezone.as_deref().map(str::trim)).await?;
    }
    if let Some(language) = &update.language {
        repo.set(LANGUAGE_KEY, language.as_deref()).await?;
    }

    tracing::info!("Updated settings for user {}", principal.user_id);
    Ok(Json(repo.load().await?))
}
