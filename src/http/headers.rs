//! Header sanitization between transport legs.
//!
//! # Responsibilities
//! - Strip hop-by-hop and encoding headers before forwarding a request
//! - Strip encoding headers from upstream responses before replying
//! - Never forward the attestation token upstream
//!
//! # Design Decisions
//! - Pure function of (headers, direction); no side effects
//! - The forwarder fully buffers and transparently decompresses bodies, so
//!   stale framing/encoding headers on either leg would describe bytes
//!   that no longer exist

use axum::http::HeaderMap;

use crate::attest::APP_CHECK_HEADER;

/// Which transport leg the headers are about to cross.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Proxy → upstream.
    Request,
    /// Upstream → client.
    Response,
}

/// Headers never forwarded to an upstream. The attestation token is
/// proxy-internal; the rest describe the inbound transport leg.
const STRIP_REQUEST: &[&str] = &[
    "host",
    "content-length",
    "transfer-encoding",
    "connection",
    APP_CHECK_HEADER,
    "content-encoding",
];

/// Headers never returned to the client. The upstream body is already
/// decoded when it reaches the response writer; forwarding the original
/// `content-encoding` would make the client decompress plain bytes.
const STRIP_RESPONSE: &[&str] = &["content-encoding", "transfer-encoding", "content-length"];

/// Copy `headers`, dropping the strip list for `direction`. All other
/// headers pass through unchanged.
pub fn sanitize(headers: &HeaderMap, direction: Direction) -> HeaderMap {
    let strip = match direction {
        Direction::Request => STRIP_REQUEST,
        Direction::Response => STRIP_RESPONSE,
    };

    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        // HeaderMap keys are already lowercase, so this comparison is
        // case-insensitive with respect to the original wire form.
        if strip.contains(&name.as_str()) {
            continue;
        }
        out.append(name.clone(), value.clone());
    }
    out
}
