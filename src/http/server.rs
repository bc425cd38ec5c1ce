//! HTTP server setup and request dispatch.
//!
//! # Responsibilities
//! - Create the Axum router (health endpoint + catch-all proxy handler)
//! - Wire up middleware (tracing, timeout, request ID)
//! - Resolve routes, gate on attestation, forward to upstreams
//! - Serve with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::cors::{Any, CorsLayer};
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::attest::{AttestationOutcome, Verifier, APP_CHECK_HEADER};
use crate::config::ProxyConfig;
use crate::http::error::ProxyError;
use crate::http::forward::{merge_query, Forwarder};
use crate::http::headers::{sanitize, Direction};
use crate::http::request::MakeRequestUuid;
use crate::http::response::client_response;
use crate::routing::RouteTable;

/// Application state injected into handlers. Everything here is immutable
/// for the lifetime of the process; requests share it without locking.
#[derive(Clone)]
pub struct AppState {
    routes: Arc<RouteTable>,
    verifier: Verifier,
    forwarder: Arc<Forwarder>,
    max_body_bytes: usize,
}

/// HTTP server for the API proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
}

impl HttpServer {
    /// Build the server from validated configuration and a ready verifier.
    pub fn new(config: ProxyConfig, verifier: Verifier) -> Result<Self, ProxyError> {
        let forwarder = Forwarder::new(Duration::from_secs(config.timeouts.upstream_secs))
            .map_err(ProxyError::from)?;

        let state = AppState {
            routes: Arc::new(RouteTable::from_config(&config.upstreams)),
            verifier,
            forwarder: Arc::new(forwarder),
            max_body_bytes: config.listener.max_body_bytes,
        };

        let router = Self::build_router(&config, state);
        Ok(Self { router, config })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &ProxyConfig, state: AppState) -> Router {
        // Browser clients call the proxy directly, so CORS is wide open:
        // any origin, any method, any header. Preflight requests are
        // answered by the layer and never reach the route table.
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(health_handler))
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.timeouts.request_secs,
            )))
            .layer(cors)
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Clone of the router, for in-process testing without a listener.
    pub fn router(&self) -> Router {
        self.router.clone()
    }
}

/// Liveness probe. Bypasses attestation and the route table entirely; must
/// never depend on API keys or upstream reachability.
async fn health_handler() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

/// Whether a body-collection error came from the size cap rather than a
/// transport failure (client disconnect, malformed framing).
fn body_limit_exceeded(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> =
        Some(err as &(dyn std::error::Error + 'static));
    while let Some(inner) = source {
        if inner
            .downcast_ref::<http_body_util::LengthLimitError>()
            .is_some()
        {
            return true;
        }
        source = inner.source();
    }
    false
}

/// Main proxy handler: resolve the route, gate on attestation, inject the
/// credential, and forward.
async fn proxy_handler(
    State(state): State<AppState>,
    request: Request<Body>,
) -> Result<Response, ProxyError> {
    let (parts, body) = request.into_parts();
    let path = parts.uri.path();

    let matched = state.routes.resolve(path).ok_or_else(|| {
        tracing::debug!(path = %path, "no route matched");
        ProxyError::NoRoute
    })?;
    let route = matched.route;

    if !route.allows(&parts.method) {
        return Err(ProxyError::MethodNotAllowed);
    }

    // Attestation gate. Nothing is forwarded until this passes.
    let token = parts
        .headers
        .get(APP_CHECK_HEADER)
        .and_then(|v| v.to_str().ok());
    match state.verifier.verify(token).await {
        AttestationOutcome::Valid | AttestationOutcome::Disabled => {}
        AttestationOutcome::Missing => {
            tracing::warn!(route = route.name, "request without App Check token");
            return Err(ProxyError::AuthMissing);
        }
        AttestationOutcome::Invalid(reason) => {
            tracing::warn!(route = route.name, %reason, "App Check verification failed");
            return Err(ProxyError::AuthInvalid);
        }
    }

    if route.api_key.is_empty() {
        tracing::error!(route = route.name, key_env = route.key_env, "upstream key missing");
        return Err(ProxyError::UpstreamNotConfigured(route.key_env));
    }

    let body = axum::body::to_bytes(body, state.max_body_bytes)
        .await
        .map_err(|err| {
            if body_limit_exceeded(&err) {
                ProxyError::BodyTooLarge
            } else {
                tracing::debug!(route = route.name, error = %err, "request body read failed");
                ProxyError::BodyReadFailed
            }
        })?;

    let upstream_url = route.upstream_url(matched.suffix);
    let query = merge_query(parts.uri.query(), route.key_param, &route.api_key);
    let headers = sanitize(&parts.headers, Direction::Request);

    tracing::debug!(
        route = route.name,
        method = %parts.method,
        path = %path,
        "forwarding request"
    );

    let outbound = state
        .forwarder
        .forward(parts.method.clone(), &upstream_url, &query, headers, body)
        .await
        .map_err(|err| {
            tracing::error!(route = route.name, error = %err, "upstream call failed");
            ProxyError::from(err)
        })?;

    tracing::debug!(
        route = route.name,
        status = outbound.status.as_u16(),
        "upstream responded"
    );

    Ok(client_response(outbound))
}
