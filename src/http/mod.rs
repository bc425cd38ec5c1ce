//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, catch-all dispatch, health endpoint)
//!     → routing table resolves the upstream
//!     → attestation gate
//!     → headers.rs (request-direction sanitization)
//!     → forward.rs (single outbound call, key injection)
//!     → response.rs (response-direction sanitization)
//!     → Send to client
//! ```

pub mod error;
pub mod forward;
pub mod headers;
pub mod request;
pub mod response;
pub mod server;

pub use error::ProxyError;
pub use forward::{Forwarder, OutboundResult};
pub use headers::{sanitize, Direction};
pub use server::HttpServer;
