//! Outbound call to an upstream service.
//!
//! # Responsibilities
//! - Issue exactly one outbound request per inbound request (no retries;
//!   upstream POST semantics are not idempotent in general)
//! - Merge the injected credential into the query string, overriding any
//!   client-supplied value under the same name
//! - Capture status, headers, and body unmodified
//!
//! # Design Decisions
//! - Single shared client: connection pooling is safe because credentials
//!   ride in the per-request query string, never in connection state
//! - The client transparently decompresses gzip bodies; the response
//!   sanitizer strips the now-stale encoding headers
//! - Timeout is reported distinctly from other network failures

use std::time::Duration;

use axum::body::Bytes;
use axum::http::{HeaderMap, Method, StatusCode};
use thiserror::Error;
use url::form_urlencoded;
use url::Url;

/// Failures of the outbound leg.
#[derive(Debug, Error)]
pub enum ForwardError {
    #[error("upstream call exceeded its deadline")]
    Timeout,

    #[error("upstream unreachable: {0}")]
    Unreachable(String),

    #[error("could not build upstream URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// What the upstream sent back, pre-sanitization. Consumed once by the
/// response writer; never cached or reused.
#[derive(Debug)]
pub struct OutboundResult {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
    pub content_type: Option<String>,
}

/// Shared outbound HTTP client with a fixed per-call deadline.
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Result<Self, ForwardError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ForwardError::Unreachable(format!("client init failed: {e}")))?;
        Ok(Self { client })
    }

    /// Perform the single outbound call. `query` is the already-merged
    /// query string; `headers` must be request-sanitized by the caller.
    pub async fn forward(
        &self,
        method: Method,
        upstream_url: &str,
        query: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<OutboundResult, ForwardError> {
        let mut url = Url::parse(upstream_url)?;
        url.set_query(if query.is_empty() { None } else { Some(query) });

        let response = self
            .client
            .request(method, url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(classify)?;

        let status = response.status();
        let headers = response.headers().clone();
        let content_type = headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(classify)?;

        Ok(OutboundResult {
            status,
            headers,
            body,
            content_type,
        })
    }
}

fn classify(err: reqwest::Error) -> ForwardError {
    if err.is_timeout() {
        ForwardError::Timeout
    } else {
        // Strip the URL from the rendered error so query strings (which
        // carry the injected key) never reach logs.
        ForwardError::Unreachable(err.without_url().to_string())
    }
}

/// Merge the injected credential into the client's query string.
///
/// Client parameters are copied in order; any client-supplied pair under
/// the key parameter's name is dropped so the injected value always wins.
/// The proxy, never the client, is the authoritative credential source.
pub fn merge_query(original: Option<&str>, key_param: &str, api_key: &str) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    if let Some(raw) = original {
        for (name, value) in form_urlencoded::parse(raw.as_bytes()) {
            if name != key_param {
                serializer.append_pair(&name, &value);
            }
        }
    }
    serializer.append_pair(key_param, api_key);
    serializer.finish()
}
