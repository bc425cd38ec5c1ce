//! Route table and prefix matching.

use axum::http::Method;

use crate::config::UpstreamsConfig;

/// One proxied upstream: where to forward, which methods are accepted, and
/// which query parameter carries the injected credential.
#[derive(Debug, Clone)]
pub struct UpstreamRoute {
    /// Short identifier for logs.
    pub name: &'static str,

    /// Path prefix selecting this route (no trailing slash).
    pub prefix: &'static str,

    /// Upstream base URL the suffix is joined onto.
    pub base_url: String,

    /// Query parameter name the upstream expects its API key under.
    pub key_param: &'static str,

    /// Environment variable the key comes from; named in 503 responses so
    /// operators can tell which secret is missing.
    pub key_env: &'static str,

    /// Injected credential. Empty means unconfigured.
    pub api_key: String,

    /// HTTP methods this upstream accepts through the proxy.
    pub allowed_methods: Vec<Method>,
}

impl UpstreamRoute {
    pub fn allows(&self, method: &Method) -> bool {
        self.allowed_methods.contains(method)
    }

    /// Join the matched path suffix onto the base URL. Pure concatenation:
    /// the proxy performs no path validation or normalisation, malformed
    /// paths are the upstream's to reject.
    pub fn upstream_url(&self, suffix: &str) -> String {
        let base = self.base_url.trim_end_matches('/');
        if suffix.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{suffix}")
        }
    }
}

/// A successful route lookup: the route plus the path remainder after its
/// prefix, without the leading slash.
#[derive(Debug)]
pub struct RouteMatch<'t, 'p> {
    pub route: &'t UpstreamRoute,
    pub suffix: &'p str,
}

/// Immutable set of proxied upstreams, built once at startup.
#[derive(Debug)]
pub struct RouteTable {
    routes: Vec<UpstreamRoute>,
}

impl RouteTable {
    /// Build the closed route set from configuration.
    pub fn from_config(upstreams: &UpstreamsConfig) -> Self {
        let routes = vec![
            UpstreamRoute {
                name: "tmdb",
                prefix: "/tmdb",
                base_url: upstreams.tmdb.base_url.clone(),
                key_param: "api_key",
                key_env: "TMDB_API_KEY",
                api_key: upstreams.tmdb.api_key.clone(),
                allowed_methods: vec![Method::GET, Method::POST, Method::DELETE],
            },
            UpstreamRoute {
                name: "gemini",
                prefix: "/gemini",
                base_url: upstreams.gemini.base_url.clone(),
                key_param: "key",
                key_env: "GEMINI_API_KEY",
                api_key: upstreams.gemini.api_key.clone(),
                allowed_methods: vec![Method::GET, Method::POST],
            },
            UpstreamRoute {
                name: "omdb",
                prefix: "/omdb",
                base_url: upstreams.omdb.base_url.clone(),
                key_param: "apikey",
                key_env: "OMDB_API_KEY",
                api_key: upstreams.omdb.api_key.clone(),
                allowed_methods: vec![Method::GET],
            },
        ];
        Self { routes }
    }

    /// Longest-prefix match over the route table.
    pub fn resolve<'t, 'p>(&'t self, path: &'p str) -> Option<RouteMatch<'t, 'p>> {
        let mut best: Option<RouteMatch<'t, 'p>> = None;
        for route in &self.routes {
            if let Some(suffix) = strip_prefix(path, route.prefix) {
                let longer = best
                    .as_ref()
                    .map(|b| route.prefix.len() > b.route.prefix.len())
                    .unwrap_or(true);
                if longer {
                    best = Some(RouteMatch { route, suffix });
                }
            }
        }
        best
    }

    pub fn routes(&self) -> &[UpstreamRoute] {
        &self.routes
    }
}

/// Match `path` against `prefix` at a segment boundary, returning the
/// remainder without its leading slash.
fn strip_prefix<'p>(path: &'p str, prefix: &str) -> Option<&'p str> {
    let rest = path.strip_prefix(prefix)?;
    if rest.is_empty() {
        Some("")
    } else {
        rest.strip_prefix('/')
    }
}
