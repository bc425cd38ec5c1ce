//! Building the client-facing response from an upstream result.

use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderValue;
use axum::response::Response;

use crate::http::forward::OutboundResult;
use crate::http::headers::{sanitize, Direction};

/// Convert an upstream result into the reply sent to the client.
///
/// The upstream's status and body pass through unmodified; headers go
/// through response-direction sanitization. Axum recomputes framing
/// headers (`content-length`) for the buffered body.
pub fn client_response(outbound: OutboundResult) -> Response {
    let mut response = Response::new(Body::from(outbound.body));
    *response.status_mut() = outbound.status;
    *response.headers_mut() = sanitize(&outbound.headers, Direction::Response);

    // Content type survives sanitization, but restore it explicitly in
    // case the upstream only conveyed it out-of-band.
    if !response.headers().contains_key(CONTENT_TYPE) {
        if let Some(ct) = outbound
            .content_type
            .as_deref()
            .and_then(|ct| HeaderValue::from_str(ct).ok())
        {
            response.headers_mut().insert(CONTENT_TYPE, ct);
        }
    }

    response
}
