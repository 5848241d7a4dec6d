//! Per-request correlation and completion logging.

use apidoc_telemetry::RequestContext;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::Next;
use axum::response::Response;
use tracing::Instrument;
use uuid::Uuid;

/// Header carrying the request id, honoured on input and echoed on output.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Run the request inside a `request` span and log its status and latency.
pub async fn track_request(request: Request, next: Next) -> Response {
    let mut context = RequestContext::new(request.method().as_str(), request.uri().path());
    if let Some(id) = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| Uuid::parse_str(v).ok())
    {
        context = context.with_request_id(id);
    }

    let mut guard = context.guard();
    let mut response = next.run(request).instrument(context.span()).await;
    guard.set_status(response.status().as_u16());

    if let Ok(value) = HeaderValue::from_str(&context.request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}
