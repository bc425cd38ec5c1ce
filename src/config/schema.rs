//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the API proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limit).
    pub listener: ListenerConfig,

    /// App Check attestation settings.
    pub app_check: AppCheckConfig,

    /// The three upstream services and their credentials.
    pub upstreams: UpstreamsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum inbound request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// App Check attestation configuration.
///
/// When enabled, every non-health request must carry a valid attestation
/// token in the `X-Firebase-AppCheck` header.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppCheckConfig {
    /// Enforce attestation. Disabled configs accept all traffic.
    pub enabled: bool,

    /// Firebase project number. Pins the expected token issuer and audience.
    pub project_number: String,

    /// JWKS endpoint of the token issuer.
    pub jwks_url: String,

    /// How long a fetched JWKS is trusted before refresh, in seconds.
    pub jwks_refresh_secs: u64,
}

impl Default for AppCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            project_number: String::new(),
            jwks_url: "https://firebaseappcheck.googleapis.com/v1/jwks".to_string(),
            jwks_refresh_secs: 6 * 60 * 60,
        }
    }
}

/// The full set of proxied upstream services.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamsConfig {
    pub tmdb: UpstreamConfig,
    pub gemini: UpstreamConfig,
    pub omdb: UpstreamConfig,
}

impl Default for UpstreamsConfig {
    fn default() -> Self {
        Self {
            tmdb: UpstreamConfig::new("https://api.themoviedb.org/3"),
            gemini: UpstreamConfig::new("https://generativelanguage.googleapis.com"),
            omdb: UpstreamConfig::new("https://www.omdbapi.com"),
        }
    }
}

/// A single upstream service.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL requests are forwarded to.
    pub base_url: String,

    /// Server-held API key injected into every forwarded request.
    /// Empty means unconfigured; requests for this upstream get 503.
    pub api_key: String,
}

impl UpstreamConfig {
    fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_key: String::new(),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self::new("")
    }
}

/// Timeout configuration for various operations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a single outbound upstream call, in seconds.
    pub upstream_secs: u64,

    /// Total inbound request timeout in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            upstream_secs: 30,
            request_secs: 60,
        }
    }
}
