//! Authenticated API proxy.
//!
//! Sits between a client application and three third-party REST APIs (TMDB,
//! Gemini, OMDb), injecting server-held API keys so clients never see them
//! and rejecting traffic that does not carry a valid App Check attestation
//! token.
//!
//! # Architecture Overview
//!
//! ```text
//!                       ┌───────────────────────────────────────────────┐
//!                       │                  API PROXY                     │
//!                       │                                                │
//!   Client Request      │  ┌─────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ────────────────────┼─▶│  http   │──▶│ routing │──▶│   attest    │  │
//!                       │  │ server  │   │  table  │   │  verifier   │  │
//!                       │  └─────────┘   └─────────┘   └──────┬──────┘  │
//!                       │                                     │         │
//!                       │                                     ▼         │
//!   Client Response     │  ┌─────────┐   ┌─────────┐   ┌─────────────┐  │
//!   ◀───────────────────┼──│response │◀──│ header  │◀──│  upstream   │◀─┼── Upstream
//!                       │  │ builder │   │sanitizer│   │  forwarder  │  │    API
//!                       │  └─────────┘   └─────────┘   └─────────────┘  │
//!                       │                                                │
//!                       │  ┌──────────────────────────────────────────┐ │
//!                       │  │  config (env/TOML)   lifecycle (signals) │ │
//!                       │  └──────────────────────────────────────────┘ │
//!                       └───────────────────────────────────────────────┘
//! ```
//!
//! `GET /health` bypasses the attestation gate and the route table entirely;
//! everything else resolves an upstream by longest path prefix, passes the
//! attestation gate, and is forwarded with the route's API key merged into
//! the query string.

// Core subsystems
pub mod attest;
pub mod config;
pub mod http;
pub mod routing;

// Cross-cutting concerns
pub mod lifecycle;

pub use attest::Verifier;
pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
