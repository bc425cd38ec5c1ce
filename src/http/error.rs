//! Error taxonomy for the request-handling boundary.
//!
//! Every failure a handler can hit is converted into a structured HTTP
//! response here: an appropriate status code and a short, non-sensitive
//! message. Internal detail (backend errors, network causes) goes to the
//! logs, never into a response body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::http::forward::ForwardError;

/// Failures surfaced to the client.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("Missing App Check token")]
    AuthMissing,

    #[error("Invalid App Check token")]
    AuthInvalid,

    #[error("No matching route")]
    NoRoute,

    #[error("Method not allowed for this route")]
    MethodNotAllowed,

    #[error("Request body too large")]
    BodyTooLarge,

    /// The inbound body could not be read: client disconnect or broken
    /// framing, not the size cap.
    #[error("Invalid request body")]
    BodyReadFailed,

    /// Named after the environment variable so operators can tell which
    /// secret is missing. Never contains a key value.
    #[error("{0} not configured")]
    UpstreamNotConfigured(&'static str),

    #[error("Upstream request failed")]
    UpstreamUnreachable,

    #[error("Upstream request timed out")]
    UpstreamTimeout,
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::AuthMissing | ProxyError::AuthInvalid => StatusCode::UNAUTHORIZED,
            ProxyError::NoRoute => StatusCode::NOT_FOUND,
            ProxyError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ProxyError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::BodyReadFailed => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamNotConfigured(_) => StatusCode::SERVICE_UNAVAILABLE,
            ProxyError::UpstreamUnreachable => StatusCode::BAD_GATEWAY,
            ProxyError::UpstreamTimeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl From<ForwardError> for ProxyError {
    fn from(err: ForwardError) -> Self {
        match err {
            ForwardError::Timeout => ProxyError::UpstreamTimeout,
            ForwardError::Unreachable(_) | ForwardError::InvalidUrl(_) => {
                ProxyError::UpstreamUnreachable
            }
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(ProxyError::AuthMissing.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProxyError::AuthInvalid.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(ProxyError::NoRoute.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            ProxyError::MethodNotAllowed.status(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(
            ProxyError::BodyTooLarge.status(),
            StatusCode::PAYLOAD_TOO_LARGE
        );
        assert_eq!(ProxyError::BodyReadFailed.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::UpstreamNotConfigured("TMDB_API_KEY").status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ProxyError::UpstreamUnreachable.status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            ProxyError::UpstreamTimeout.status(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn unconfigured_message_names_the_variable() {
        let err = ProxyError::UpstreamNotConfigured("GEMINI_API_KEY");
        assert_eq!(err.to_string(), "GEMINI_API_KEY not configured");
    }

    #[test]
    fn forward_errors_map_to_gateway_statuses() {
        assert_eq!(
            ProxyError::from(ForwardError::Timeout).status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            ProxyError::from(ForwardError::Unreachable("refused".into())).status(),
            StatusCode::BAD_GATEWAY
        );
    }
}
