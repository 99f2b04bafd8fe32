//! Span names and attribute keys for platform calls.
//!
//! HTTP attributes follow the OpenTelemetry HTTP client conventions so the
//! OTel stdout export lines up with other tooling. Fields are declared
//! `Empty` when the span opens and filled in with `Span::record` using the
//! constants below.

use tracing::Span;
use tracing::field::Empty;

/// Name of the span wrapping one logical platform request (all attempts).
pub const SPAN_PLATFORM_REQUEST: &str = "platform.request";

/// HTTP method of the request.
pub const HTTP_REQUEST_METHOD: &str = "http.request.method";

/// Path relative to the platform base URL.
pub const URL_PATH: &str = "url.path";

/// Final HTTP status code observed.
pub const HTTP_RESPONSE_STATUS_CODE: &str = "http.response.status_code";

/// Number of attempts made, retries included.
pub const ATTEMPTS: &str = "voxclone.attempts";

/// Resource kind (`tool` or `assistant`).
pub const RESOURCE_KIND: &str = "voxclone.resource.kind";

/// Open the span for one platform request.
pub fn platform_request_span(method: &str, path: &str, kind: &str) -> Span {
    tracing::info_span!(
        "platform.request",
        http.request.method = method,
        url.path = path,
        voxclone.resource.kind = kind,
        http.response.status_code = Empty,
        voxclone.attempts = Empty,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_declares_recordable_fields() {
        let span = platform_request_span("GET", "/tool", "tool");
        // Without a subscriber the span is disabled; recording must still be safe.
        span.record(HTTP_RESPONSE_STATUS_CODE, 200_u16);
        span.record(ATTEMPTS, 1_u32);
        assert_eq!(SPAN_PLATFORM_REQUEST, "platform.request");
    }

    #[test]
    fn test_field_names_are_dotted() {
        for name in [HTTP_REQUEST_METHOD, URL_PATH, HTTP_RESPONSE_STATUS_CODE, ATTEMPTS, RESOURCE_KIND] {
            assert!(name.contains('.'), "{name}");
        }
    }
}
