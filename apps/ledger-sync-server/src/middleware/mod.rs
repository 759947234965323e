//! Request middleware
//!
//! Applied outermost first: the request context (locale, principal,
//! timezone) wraps the content-type gate, which wraps the handlers.

mod content_type;
mod request_context;

pub use content_type::require_json;
pub use request_context::request_context;
