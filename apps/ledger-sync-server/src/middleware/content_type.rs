//! Content-type gate

use axum::{
    extract::Request,
    http::{header::CONTENT_TYPE, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::error::AppError;

/// Reject bodies that are not JSON with `415 Unsupported Media Type`.
///
/// `GET` and `DELETE` are exempt, as are `HEAD` and `OPTIONS`, which never
/// carry a body.
pub async fn require_json(request: Request, next: Next) -> Response {
    let exempt = matches!(
        *request.method(),
        Method::GET | Method::DELETE | Method::HEAD | Method::OPTIONS
    );

    if !exempt && !is_json(&request) {
        tracing::debug!(
            "Rejecting {} {} with content type {:?}",
            request.method(),
            request.uri(),
            request.headers().get(CONTENT_TYPE)
        );
        return AppError::UnsupportedMediaType.into_response();
    }

    next.run(request).await
}

fn is_json(request: &Request) -> bool {
    request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}
