//! Configuration for jsonproxy
//!
//! Settings come from command-line flags or `JSONPROXY_*` environment
//! variables. [`Settings::resolve`] validates them and loads the role
//! registry, producing the immutable [`ProxyConfig`] the server is built from.
//! Every failure here is a configuration error and fatal at startup.

pub mod config;
pub mod loader;

pub use config::{ProxyConfig, Settings, DEFAULT_UPSTREAM_TIMEOUT_SECS, ENV_PREFIX};
pub use loader::load_role_registry;
