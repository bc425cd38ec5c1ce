//! Attestation enforcement gate.

use std::sync::Arc;

use crate::attest::AppCheckBackend;

/// Result of checking one request's attestation token.
///
/// Computed fresh per request; carries no identity beyond pass/fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationOutcome {
    /// Enforcement is off; the request proceeds.
    Disabled,
    /// Token was present and verified.
    Valid,
    /// No token was supplied.
    Missing,
    /// Token was supplied but rejected. The reason is for logs only and
    /// must not reach response bodies.
    Invalid(String),
}

impl AttestationOutcome {
    /// Whether the request may proceed to an upstream.
    pub fn permits(&self) -> bool {
        matches!(self, AttestationOutcome::Disabled | AttestationOutcome::Valid)
    }
}

/// Stateless attestation verifier shared across all requests.
#[derive(Clone)]
pub struct Verifier {
    backend: Option<Arc<dyn AppCheckBackend>>,
}

impl Verifier {
    /// A verifier that accepts everything (enforcement off).
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    /// A verifier that checks every token against the given backend.
    pub fn enforcing(backend: Arc<dyn AppCheckBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    pub fn is_enforcing(&self) -> bool {
        self.backend.is_some()
    }

    /// Classify a request's token. Never fails: backend errors become
    /// `Invalid` with the error rendered as the reason.
    pub async fn verify(&self, token: Option<&str>) -> AttestationOutcome {
        let Some(backend) = &self.backend else {
            return AttestationOutcome::Disabled;
        };

        let Some(token) = token else {
            return AttestationOutcome::Missing;
        };

        match backend.verify_token(token).await {
            Ok(()) => AttestationOutcome::Valid,
            Err(err) => AttestationOutcome::Invalid(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attest::{AppCheckBackend, BackendError};
    use async_trait::async_trait;

    struct Fixed(Result<(), &'static str>);

    #[async_trait]
    impl AppCheckBackend for Fixed {
        async fn verify_token(&self, _token: &str) -> Result<(), BackendError> {
            self.0.map_err(|m| BackendError::Rejected(m.to_string()))
        }
    }

    #[tokio::test]
    async fn disabled_passes_everything() {
        let verifier = Verifier::disabled();
        assert_eq!(verifier.verify(None).await, AttestationOutcome::Disabled);
        assert_eq!(
            verifier.verify(Some("anything")).await,
            AttestationOutcome::Disabled
        );
        assert!(!verifier.is_enforcing());
    }

    #[tokio::test]
    async fn missing_token_is_flagged() {
        let verifier = Verifier::enforcing(Arc::new(Fixed(Ok(()))));
        assert_eq!(verifier.verify(None).await, AttestationOutcome::Missing);
        assert!(!AttestationOutcome::Missing.permits());
    }

    #[tokio::test]
    async fn backend_accept_yields_valid() {
        let verifier = Verifier::enforcing(Arc::new(Fixed(Ok(()))));
        let outcome = verifier.verify(Some("token")).await;
        assert_eq!(outcome, AttestationOutcome::Valid);
        assert!(outcome.permits());
    }

    #[tokio::test]
    async fn backend_error_yields_invalid_not_panic() {
        let verifier = Verifier::enforcing(Arc::new(Fixed(Err("expired"))));
        match verifier.verify(Some("token")).await {
            AttestationOutcome::Invalid(reason) => assert!(reason.contains("expired")),
            other => panic!("expected Invalid, got {other:?}"),
        }
    }
}
