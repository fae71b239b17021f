//! Request ID middleware.
//!
//! Every request gets a correlation ID: the `x-request-id` header when an
//! upstream proxy already assigned one, otherwise a fresh UUID v4. The ID
//! is recorded on the current tracing span, tagged onto the Sentry scope,
//! and echoed back in the response headers.

use axum::{extract::Request, http::HeaderValue, middleware::Next, response::Response};
use tracing::Span;
use uuid::Uuid;

/// Header carrying the request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

pub async fn request_id_middleware(request: Request, next: Next) -> Response {
    let request_id = incoming_id(&request).unwrap_or_else(|| Uuid::new_v4().to_string());

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

/// Take the upstream-assigned ID, ignoring unreasonable values.
fn incoming_id(request: &Request) -> Option<String> {
    let value = request.headers().get(REQUEST_ID_HEADER)?.to_str().ok()?;
    (!value.is_empty() && value.len() <= 128).then(|| value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_header(value: &str) -> Request {
        Request::builder()
            .header(REQUEST_ID_HEADER, value)
            .body(Body::empty())
            .expect("valid request")
    }

    #[test]
    fn test_incoming_id_accepts_upstream_value() {
        let request = request_with_header("abc-123");
        assert_eq!(incoming_id(&request).as_deref(), Some("abc-123"));
    }

    #[test]
    fn test_incoming_id_rejects_empty_and_oversized() {
        assert!(incoming_id(&request_with_header("")).is_none());
        assert!(incoming_id(&request_with_header(&"x".repeat(129))).is_none());
    }

    #[test]
    fn test_incoming_id_absent() {
        let request = Request::builder()
            .body(Body::empty())
            .expect("valid request");
        assert!(incoming_id(&request).is_none());
    }
}
