//! Request context middleware

use axum::{
    extract::{Request, State},
    http::header::ACCEPT_LANGUAGE,
    middleware::Next,
    response::Response,
};
use chrono_tz::Tz;

use crate::context::{user_language, user_timezone, Principal, RequestContext};
use crate::db::SettingsRepository;
use crate::error::{PendingError, Result};
use crate::locale::{self, Locale};
use crate::state::AppState;

/// Build the [`RequestContext`] for this request and localize any error
/// response produced further down the stack.
///
/// A signed-in user's `language` setting replaces the configured default
/// locale; `Accept-Language` still takes precedence over both.
pub async fn request_context(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let locales = &state.config().locale;
    let accept_language = request
        .headers()
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let principal = Principal::from_headers(request.headers());

    let (default_locale, timezone) = match &principal {
        Some(p) => match user_preferences(&state, &p.user_id).await {
            Ok((language, timezone)) => (language.unwrap_or(locales.default), timezone),
            Err(e) => {
                tracing::warn!("Falling back to default preferences for {}: {}", p.user_id, e);
                (locales.default, None)
            }
        },
        None => (locales.default, None),
    };

    let locale = locale::negotiate(accept_language.as_deref(), default_locale, &locales.supported);

    request
        .extensions_mut()
        .insert(RequestContext::new(locale, principal, timezone));

    localize(next.run(request).await, locale)
}

async fn user_preferences(state: &AppState, user_id: &str) -> Result<(Option<Locale>, Option<Tz>)> {
    let settings = SettingsRepository::new(state.db(), user_id);
    let language = user_language(&settings, &state.config().locale.supported).await?;
    let timezone = user_timezone(&settings).await?;
    Ok((language, timezone))
}

fn localize(response: Response, locale: Locale) -> Response {
    match response.extensions().get::<PendingError>() {
        Some(pending) => pending.render(locale),
        None => response,
    }
}
