//! Configuration loading and environment overrides.

use std::collections::HashMap;
use std::fs;
use std::net::SocketAddr;
use std::path::Path;

use thiserror::Error;
use url::Url;

use crate::config::schema::ProxyConfig;

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Load configuration: defaults, then an optional TOML file, then
/// environment overrides. Validation runs last, on the merged result.
pub fn load(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(p) => toml::from_str(&fs::read_to_string(p)?)?,
        None => ProxyConfig::default(),
    };

    let env: HashMap<String, String> = std::env::vars().collect();
    apply_env_overrides(&mut config, &env);

    validate(&config)?;
    Ok(config)
}

/// Apply environment overrides from a key/value map.
///
/// Taking a map instead of reading `std::env` directly keeps this testable
/// without mutating process state.
pub fn apply_env_overrides(config: &mut ProxyConfig, env: &HashMap<String, String>) {
    if let Some(v) = non_empty(env, "APP_CHECK_ENABLED") {
        config.app_check.enabled = v.trim().eq_ignore_ascii_case("true");
    }
    if let Some(v) = non_empty(env, "FIREBASE_PROJECT_NUMBER") {
        config.app_check.project_number = v;
    }
    if let Some(v) = non_empty(env, "APP_CHECK_JWKS_URL") {
        config.app_check.jwks_url = v;
    }

    if let Some(v) = non_empty(env, "TMDB_API_KEY") {
        config.upstreams.tmdb.api_key = v;
    }
    if let Some(v) = non_empty(env, "GEMINI_API_KEY") {
        config.upstreams.gemini.api_key = v;
    }
    if let Some(v) = non_empty(env, "OMDB_API_KEY") {
        config.upstreams.omdb.api_key = v;
    }

    if let Some(v) = non_empty(env, "TMDB_BASE_URL") {
        config.upstreams.tmdb.base_url = v;
    }
    if let Some(v) = non_empty(env, "GEMINI_BASE_URL") {
        config.upstreams.gemini.base_url = v;
    }
    if let Some(v) = non_empty(env, "OMDB_BASE_URL") {
        config.upstreams.omdb.base_url = v;
    }

    if let Some(v) = non_empty(env, "BIND_ADDRESS") {
        config.listener.bind_address = v;
    } else if let Some(port) = non_empty(env, "PORT") {
        // Cloud-hosted platforms hand us a bare port number.
        config.listener.bind_address = format!("0.0.0.0:{}", port.trim());
    }
}

fn non_empty(env: &HashMap<String, String>, key: &str) -> Option<String> {
    env.get(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Semantic validation of the merged configuration.
fn validate(config: &ProxyConfig) -> Result<(), ConfigError> {
    config
        .listener
        .bind_address
        .parse::<SocketAddr>()
        .map_err(|_| {
            ConfigError::Invalid(format!(
                "bind_address `{}` is not a valid socket address",
                config.listener.bind_address
            ))
        })?;

    for (name, upstream) in [
        ("tmdb", &config.upstreams.tmdb),
        ("gemini", &config.upstreams.gemini),
        ("omdb", &config.upstreams.omdb),
    ] {
        Url::parse(&upstream.base_url).map_err(|_| {
            ConfigError::Invalid(format!(
                "{} base_url `{}` is not a valid URL",
                name, upstream.base_url
            ))
        })?;
    }

    if config.timeouts.upstream_secs == 0 {
        return Err(ConfigError::Invalid(
            "timeouts.upstream_secs must be greater than zero".to_string(),
        ));
    }

    Ok(())
}
