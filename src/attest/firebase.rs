//! Firebase App Check token backend.
//!
//! App Check tokens are RS256 JWTs signed by Firebase. Verification checks
//! the signature against the published JWKS plus the issuer and audience
//! claims for the configured project. The JWKS is cached in-process and
//! refreshed when stale or when a token references an unknown key id.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use tokio::sync::RwLock;

use crate::attest::{AppCheckBackend, BackendError};
use crate::config::AppCheckConfig;

const ISSUER_BASE: &str = "https://firebaseappcheck.googleapis.com";
const JWKS_FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Verifies App Check tokens for one Firebase project.
#[derive(Debug)]
pub struct FirebaseAppCheck {
    issuer: String,
    audience: String,
    jwks_url: String,
    refresh_ttl: Duration,
    http: reqwest::Client,
    jwks: RwLock<JwksCache>,
}

#[derive(Debug)]
struct JwksCache {
    keys: Option<JwkSet>,
    fetched_at: Option<Instant>,
}

impl JwksCache {
    fn key_for(&self, kid: &str) -> Option<&jsonwebtoken::jwk::Jwk> {
        self.keys.as_ref()?.find(kid)
    }

    fn stale(&self, ttl: Duration) -> bool {
        self.fetched_at.map(|t| t.elapsed() > ttl).unwrap_or(true)
    }
}

impl FirebaseAppCheck {
    /// Initialise the backend and fetch the JWKS once, eagerly. An error
    /// here means verification cannot work; the caller decides whether to
    /// degrade or abort.
    pub async fn new(config: &AppCheckConfig) -> Result<Self, BackendError> {
        let project = config.project_number.trim();
        if project.is_empty() {
            return Err(BackendError::Unavailable(
                "FIREBASE_PROJECT_NUMBER is not configured".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(JWKS_FETCH_TIMEOUT)
            .build()
            .map_err(|e| BackendError::Unavailable(format!("http client init failed: {e}")))?;

        let backend = Self {
            issuer: format!("{ISSUER_BASE}/{project}"),
            audience: format!("projects/{project}"),
            jwks_url: config.jwks_url.clone(),
            refresh_ttl: Duration::from_secs(config.jwks_refresh_secs),
            http,
            jwks: RwLock::new(JwksCache {
                keys: None,
                fetched_at: None,
            }),
        };

        {
            let mut cache = backend.jwks.write().await;
            refresh(&mut cache, &backend.http, &backend.jwks_url).await?;
        }

        Ok(backend)
    }

    async fn decoding_key(&self, kid: &str) -> Result<DecodingKey, BackendError> {
        {
            let cache = self.jwks.read().await;
            if let Some(jwk) = cache.key_for(kid) {
                return DecodingKey::from_jwk(jwk)
                    .map_err(|e| BackendError::Unavailable(format!("unusable JWK: {e}")));
            }
        }

        // Unknown kid: the signing keys may have rotated. Refresh at most
        // once per TTL window, then try again.
        let mut cache = self.jwks.write().await;
        if cache.stale(self.refresh_ttl) {
            refresh(&mut cache, &self.http, &self.jwks_url).await?;
        }

        match cache.key_for(kid) {
            Some(jwk) => DecodingKey::from_jwk(jwk)
                .map_err(|e| BackendError::Unavailable(format!("unusable JWK: {e}"))),
            None => Err(BackendError::Rejected(format!(
                "token kid `{kid}` not found in JWKS"
            ))),
        }
    }
}

async fn refresh(
    cache: &mut JwksCache,
    http: &reqwest::Client,
    jwks_url: &str,
) -> Result<(), BackendError> {
    let keys = http
        .get(jwks_url)
        .send()
        .await
        .map_err(|e| BackendError::Unavailable(format!("JWKS fetch failed: {e}")))?
        .error_for_status()
        .map_err(|e| BackendError::Unavailable(format!("JWKS endpoint error: {e}")))?
        .json::<JwkSet>()
        .await
        .map_err(|e| BackendError::Unavailable(format!("JWKS parse failed: {e}")))?;

    cache.keys = Some(keys);
    cache.fetched_at = Some(Instant::now());
    Ok(())
}

#[async_trait]
impl AppCheckBackend for FirebaseAppCheck {
    async fn verify_token(&self, token: &str) -> Result<(), BackendError> {
        let header = decode_header(token)
            .map_err(|e| BackendError::Malformed(format!("bad JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(BackendError::Rejected(format!(
                "unsupported algorithm {:?}, expected RS256",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| BackendError::Malformed("JWT header missing kid".to_string()))?;

        let key = self.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation.set_audience(std::slice::from_ref(&self.audience));

        decode::<serde_json::Value>(token, &key, &validation)
            .map_err(|e| BackendError::Rejected(e.to_string()))?;

        Ok(())
    }
}
