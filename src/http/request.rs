//! Request identification.
//!
//! # Responsibilities
//! - Generate a UUID v4 request ID when the client did not send one
//! - Echo the ID back in the response headers
//! - Carry the ID in the request's trace span

use axum::body::Body;
use axum::http::{HeaderName, HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use tracing::Span;
use uuid::Uuid;

pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Assigns a fresh UUID v4 to each request.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// The request ID header value, or `"unknown"`.
pub fn request_id_of<B>(request: &Request<B>) -> &str {
    request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Span for one HTTP request, tagged with its ID.
pub fn make_span(request: &Request<Body>) -> Span {
    tracing::info_span!(
        "request",
        request_id = %request_id_of(request),
        method = %request.method(),
        path = %request.uri().path(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generates_distinct_uuids() {
        let request = Request::new(());
        let mut maker = UuidRequestId;
        let a = maker.make_request_id(&request).unwrap();
        let b = maker.make_request_id(&request).unwrap();
        assert_ne!(a.header_value(), b.header_value());
        assert!(Uuid::parse_str(a.header_value().to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_request_id_of_falls_back() {
        let mut request = Request::new(());
        assert_eq!(request_id_of(&request), "unknown");
        request
            .headers_mut()
            .insert(X_REQUEST_ID, HeaderValue::from_static("abc"));
        assert_eq!(request_id_of(&request), "abc");
    }
}
