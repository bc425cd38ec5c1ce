//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file (--config)
//!     → loader.rs (parse & deserialize)
//!     → environment overrides (API keys, flags, bind address)
//!     → semantic validation (bind address, base URLs)
//!     → ProxyConfig (validated, immutable)
//!     → shared by reference with all subsystems
//! ```
//!
//! # Design Decisions
//! - Config is read once at startup and never mutated afterwards
//! - All fields have defaults to allow running with env vars alone
//! - Secrets (API keys) only ever come from the environment, matching the
//!   secret-manager-mounted variables of the deployment platform
//! - Overrides are applied from a plain key/value map so tests never touch
//!   the process environment

pub mod loader;
pub mod schema;

pub use loader::{load, ConfigError};
pub use schema::{AppCheckConfig, ListenerConfig, ProxyConfig, TimeoutConfig, UpstreamConfig, UpstreamsConfig};
