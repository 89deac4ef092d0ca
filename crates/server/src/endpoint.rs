//! Listener
//!
//! Owns the shared per-process state and serves it over hyper's HTTP/1
//! server, one task per connection.

use hyper::server::conn::AddrStream;
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, Request, Response, Server};
use jsonproxy_config::ProxyConfig;
use jsonproxy_core::Result;
use jsonproxy_security::{AuthorizationEngine, TokenCodec};
use std::convert::Infallible;
use std::future::Future;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::KeyIssuer;
use crate::proxy::{ProxyCore, UpstreamClient};
use crate::router::{RequestRouter, HEALTHCHECK_PATH};

/// The proxy server. Everything it holds is immutable after construction.
#[derive(Debug)]
pub struct ProxyServer {
    listen_addr: SocketAddr,
    api_prefix: String,
    proxy: ProxyCore,
    issuer: KeyIssuer,
}

impl ProxyServer {
    /// Build every component from a validated configuration
    pub fn new(config: ProxyConfig) -> Result<Self> {
        let codec = Arc::new(TokenCodec::new(&config.secret)?);
        let registry = Arc::new(config.registry);
        let upstream = UpstreamClient::new(config.upstream_url, config.upstream_timeout)?;

        info!(
            "Loaded {} roles, proxying to {}",
            registry.len(),
            upstream.base_url()
        );

        Ok(Self {
            listen_addr: config.listen_addr,
            api_prefix: config.api_prefix,
            proxy: ProxyCore::new(
                Arc::clone(&codec),
                AuthorizationEngine::new(Arc::clone(&registry)),
                upstream,
            ),
            issuer: KeyIssuer::new(codec, registry),
        })
    }

    pub fn listen_addr(&self) -> SocketAddr {
        self.listen_addr
    }

    /// Bind the configured address and serve until `shutdown` resolves
    pub async fn serve<F>(self: Arc<Self>, shutdown: F) -> std::result::Result<(), hyper::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let builder = Server::try_bind(&self.listen_addr)?;
        self.run(builder, shutdown).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve_on<F>(
        self: Arc<Self>,
        listener: TcpListener,
        shutdown: F,
    ) -> std::result::Result<(), hyper::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let builder = Server::from_tcp(listener)?;
        self.run(builder, shutdown).await
    }

    async fn run<F>(
        self: Arc<Self>,
        builder: hyper::server::Builder<hyper::server::conn::AddrIncoming>,
        shutdown: F,
    ) -> std::result::Result<(), hyper::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let api_prefix = self.api_prefix.clone();

        let make_svc = make_service_fn(move |conn: &AddrStream| {
            let server = Arc::clone(&self);
            let remote_addr = conn.remote_addr();

            async move {
                Ok::<_, Infallible>(service_fn(move |req| {
                    let server = Arc::clone(&server);
                    async move { server.handle_request(req, remote_addr).await }
                }))
            }
        });

        let server = builder.http1_only(true).serve(make_svc);
        let local_addr = server.local_addr();

        info!("jsonproxy ready on http://{}", local_addr);
        info!("  {} - health check", HEALTHCHECK_PATH);
        info!("  POST /{}/keys - issue a key", api_prefix);
        info!("  /* - proxied");

        match server.with_graceful_shutdown(shutdown).await {
            Ok(()) => {
                info!("Server on {} stopped", local_addr);
                Ok(())
            }
            Err(e) => {
                error!("Server error: {}", e);
                Err(e)
            }
        }
    }

    /// Handle one request. Never fails; errors become responses.
    pub async fn handle_request(
        &self,
        req: Request<Body>,
        client_addr: SocketAddr,
    ) -> std::result::Result<Response<Body>, Infallible> {
        let router = RequestRouter::new(&self.proxy, &self.issuer, &self.api_prefix);
        Ok(router.route(req, client_addr).await)
    }
}
