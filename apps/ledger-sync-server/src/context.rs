//! Per-request context
//!
//! Built once by the request-context middleware and read by handlers. It
//! carries the negotiated locale, the authenticated principal (if any) and
//! that principal's timezone.

use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap},
};
use chrono_tz::Tz;

use crate::datetime::resolve_timezone;
use crate::error::{AppError, Result};
use crate::locale::Locale;

/// Header the authenticating gateway uses to pass the resolved user
pub const USER_ID_HEADER: &str = "x-user-id";

/// Per-user configuration lookups
#[async_trait]
pub trait UserConfig: Send + Sync {
    async fn config_value(&self, key: &str) -> Result<Option<String>>;
}

/// The authenticated user a request acts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
}

impl Principal {
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(|id| Principal {
                user_id: id.to_string(),
            })
    }
}

/// Look up a user's configured timezone. Unknown zone ids count as unset.
pub async fn user_timezone(user_config: &dyn UserConfig) -> Result<Option<Tz>> {
    Ok(user_config
        .config_value("timezone")
        .await?
        .and_then(|id| resolve_timezone(&id)))
}

/// Look up a user's preferred language, if it is a locale we support.
pub async fn user_language(user_config: &dyn UserConfig, supported: &[Locale]) -> Result<Option<Locale>> {
    Ok(user_config
        .config_value("language")
        .await?
        .and_then(|tag| tag.parse::<Locale>().ok())
        .filter(|locale| supported.contains(locale)))
}

#[derive(Debug, Clone)]
pub struct RequestContext {
    locale: Locale,
    principal: Option<Principal>,
    timezone: Option<Tz>,
}

impl RequestContext {
    pub fn new(locale: Locale, principal: Option<Principal>, timezone: Option<Tz>) -> Self {
        Self {
            locale,
            principal,
            timezone,
        }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    pub fn principal(&self) -> Option<&Principal> {
        self.principal.as_ref()
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }

    /// The principal, or `Unauthenticated` when the request has none
    pub fn require_principal(&self) -> Result<&Principal> {
        self.principal.as_ref().ok_or(AppError::Unauthenticated)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        parts
            .extensions
            .get::<RequestContext>()
            .cloned()
            .ok_or_else(|| AppError::Internal("request context middleware is not installed".to_string()))
    }
}
