//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → table.rs (longest-prefix match over the configured routes)
//!     → Return: matched UpstreamRoute + path suffix, or NoMatch
//!
//! Table construction (at startup):
//!     UpstreamsConfig
//!     → three fixed UpstreamRoute records (prefix, base URL, key param)
//!     → Freeze as immutable RouteTable
//! ```
//!
//! # Design Decisions
//! - Routes built at startup, immutable at runtime
//! - Closed route set: the upstreams are statically enumerable, no dynamic
//!   match composition
//! - Prefixes match on segment boundaries only (`/tmdbx` never matches the
//!   `/tmdb` route)
//! - Explicit no-match rather than silent default

pub mod table;

pub use table::{RouteMatch, RouteTable, UpstreamRoute};
