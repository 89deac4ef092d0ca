//! Filtering reverse proxy for JSON APIs
//!
//! Clients present capability tokens issued by [`KeyIssuer`]; [`ProxyCore`]
//! opens them, authorizes the request against the token's roles, forwards it
//! with the real upstream credential and narrows the JSON response to the
//! fields the roles allow.

pub mod api;
pub mod endpoint;
pub mod proxy;
pub mod responses;
pub mod router;

pub use api::{IssuedKey, KeyIssuer, KeyRequest};
pub use endpoint::ProxyServer;
pub use proxy::ProxyCore;
pub use responses::{HttpResponse, UNAUTHORIZED_MESSAGE};
pub use router::{RequestRouter, HEALTHCHECK_PATH};

use jsonproxy_config::ProxyConfig;

/// Build a server from a validated configuration
pub fn build(config: ProxyConfig) -> jsonproxy_core::Result<ProxyServer> {
    ProxyServer::new(config)
}
