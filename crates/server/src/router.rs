//! Request routing
//!
//! Splits traffic between the health check, the key issuance API and the
//! proxy.

use hyper::{Body, Request, Response};
use std::net::SocketAddr;
use std::time::Instant;
use tracing::debug;

use crate::api::KeyIssuer;
use crate::proxy::ProxyCore;
use crate::responses::HttpResponse;

/// Path answered by the proxy itself with `OK`
pub const HEALTHCHECK_PATH: &str = "/debug/healthcheck";

/// Request router, built per request over the server's shared state
pub struct RequestRouter<'a> {
    proxy: &'a ProxyCore,
    issuer: &'a KeyIssuer,
    api_prefix: &'a str,
}

impl<'a> RequestRouter<'a> {
    pub fn new(proxy: &'a ProxyCore, issuer: &'a KeyIssuer, api_prefix: &'a str) -> Self {
        Self {
            proxy,
            issuer,
            api_prefix,
        }
    }

    /// Route a request to the appropriate handler
    pub async fn route(&self, req: Request<Body>, client_addr: SocketAddr) -> Response<Body> {
        let start_time = Instant::now();
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        debug!("Handling {} {} from {}", method, path, client_addr);

        let response = if path == HEALTHCHECK_PATH {
            HttpResponse::ok_text("OK\n")
        } else if let Some(api_path) = self.api_path(&path) {
            self.issuer.handle(req, api_path).await
        } else {
            self.proxy.handle(req, client_addr).await
        };

        debug!(
            "Handled {} {} from {} -> {} in {:?}",
            method,
            path,
            client_addr,
            response.status().as_u16(),
            start_time.elapsed()
        );

        response
    }

    /// The remainder of `path` when it lies under the API prefix
    fn api_path<'p>(&self, path: &'p str) -> Option<&'p str> {
        let rest = path.strip_prefix('/')?.strip_prefix(self.api_prefix)?;
        (rest.is_empty() || rest.starts_with('/')).then_some(rest)
    }
}
