//! App Check attestation subsystem.
//!
//! # Data Flow
//! ```text
//! X-Firebase-AppCheck header
//!     → verifier.rs (enforcement gate, outcome classification)
//!     → firebase.rs (RS256 JWT validation against cached JWKS)
//!     → AttestationOutcome: Disabled | Valid | Missing | Invalid
//! ```
//!
//! # Design Decisions
//! - The token backend is a capability trait so tests substitute a fake
//!   without any network dependency
//! - Backend failures surface as `Invalid(reason)`, never as a fault
//! - Backend init failure at startup degrades to enforcement-disabled with
//!   a logged warning; the proxy stays available

pub mod firebase;
pub mod verifier;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::AppCheckConfig;
use firebase::FirebaseAppCheck;
pub use verifier::{AttestationOutcome, Verifier};

/// Header carrying the client's attestation token. Proxy-internal; stripped
/// before any request is forwarded upstream.
pub const APP_CHECK_HEADER: &str = "x-firebase-appcheck";

/// Errors a token backend can produce. All of them mean the token is not
/// accepted; the variants exist for logging.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("malformed token: {0}")]
    Malformed(String),

    #[error("token rejected: {0}")]
    Rejected(String),

    #[error("verification backend unavailable: {0}")]
    Unavailable(String),
}

/// Capability interface for attestation token verification.
#[async_trait]
pub trait AppCheckBackend: Send + Sync {
    /// Verify a single token. `Ok(())` means the token is genuine.
    async fn verify_token(&self, token: &str) -> Result<(), BackendError>;
}

/// Build the process-wide verifier from configuration.
///
/// If enforcement is enabled but the backend cannot be initialised (bad
/// project settings, JWKS endpoint unreachable at boot), the proxy starts
/// anyway with enforcement disabled.
pub async fn build_verifier(config: &AppCheckConfig) -> Verifier {
    if !config.enabled {
        tracing::info!("App Check enforcement disabled by configuration");
        return Verifier::disabled();
    }

    match FirebaseAppCheck::new(config).await {
        Ok(backend) => {
            tracing::info!(
                project_number = %config.project_number,
                "App Check verifier initialised"
            );
            Verifier::enforcing(Arc::new(backend))
        }
        Err(err) => {
            tracing::warn!(
                error = %err,
                "App Check init failed, starting with enforcement disabled"
            );
            Verifier::disabled()
        }
    }
}
