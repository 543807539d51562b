/// Request correlation middleware
use crate::metrics;
use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

/// Response header echoing the correlation id
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Trace header set by Google Cloud load balancers: `TRACE_ID/SPAN_ID;o=1`
pub const CLOUD_TRACE_HEADER: &str = "x-cloud-trace-context";

/// Correlation id of the current request, stored in request extensions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

/// Pick the correlation id for a request
///
/// Prefers the upstream trace id, then a caller supplied request id, then a
/// fresh UUID.
pub fn correlation_id(headers: &HeaderMap) -> String {
    header_value(headers, CLOUD_TRACE_HEADER)
        .and_then(|value| value.split('/').next())
        .filter(|trace| !trace.is_empty())
        .or_else(|| header_value(headers, REQUEST_ID_HEADER))
        .map(String::from)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Attach a correlation id and span to every request
pub async fn request_context(mut req: Request, next: Next) -> Response {
    let request_id = correlation_id(req.headers());
    let method = req.method().clone();

    let span = tracing::info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %req.uri().path(),
    );

    req.extensions_mut().insert(RequestId(request_id.clone()));

    let mut response = next.run(req).instrument(span).await;

    metrics::record_http_request(method.as_str(), response.status().as_u16());

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}
