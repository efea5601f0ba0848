//! Request ID middleware for request tracing and correlation.
//!
//! Every request gets an ID: the one an upstream proxy sent in
//! `x-request-id`, or a fresh UUID v4. The ID is recorded in the tracing
//! span, tagged on the Sentry scope, and echoed in the response.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Longest upstream request ID that is trusted as-is.
const MAX_REQUEST_ID_LEN: usize = 128;

/// The incoming request ID, or a new one.
fn request_id(request: &Request) -> String {
    request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|h| h.to_str().ok())
        .filter(|id| !id.is_empty() && id.len() <= MAX_REQUEST_ID_LEN)
        .map_or_else(|| Uuid::new_v4().to_string(), String::from)
}

/// Middleware that ensures every request has a unique request ID.
pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = request_id(&request);

    Span::current().record("request_id", &request_id);

    sentry::configure_scope(|scope| {
        scope.set_tag("request_id", &request_id);
    });

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::Body;

    use super::*;

    #[test]
    fn test_upstream_request_id_is_kept() {
        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "cf-ray-1234")
            .body(Body::empty())
            .unwrap();
        assert_eq!(request_id(&request), "cf-ray-1234");
    }

    #[test]
    fn test_missing_or_oversized_request_id_is_generated() {
        let request = Request::builder().body(Body::empty()).unwrap();
        assert!(Uuid::parse_str(&request_id(&request)).is_ok());

        let request = Request::builder()
            .header(REQUEST_ID_HEADER, "x".repeat(MAX_REQUEST_ID_LEN + 1))
            .body(Body::empty())
            .unwrap();
        assert!(Uuid::parse_str(&request_id(&request)).is_ok());
    }
}
