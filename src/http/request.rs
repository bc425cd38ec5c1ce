//! Request ID generation.
//!
//! A UUIDv4 request ID is attached to every inbound request as early as
//! possible and propagated onto the response, so one ID correlates the
//! client call, the proxy logs, and the upstream call.

use axum::http::{HeaderValue, Request};
use tower_http::request_id::{MakeRequestId, RequestId};
use uuid::Uuid;

/// Header carrying the correlation ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// `MakeRequestId` implementation producing UUIDv4 identifiers.
#[derive(Clone, Copy, Default)]
pub struct MakeRequestUuid;

impl MakeRequestId for MakeRequestUuid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}
