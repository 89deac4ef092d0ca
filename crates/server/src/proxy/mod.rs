//! Reverse-proxy request core
//!
//! Authenticates the capability token, authorizes the request against the
//! token's roles, forwards it with the real upstream credential and narrows
//! successful JSON responses to the matched rules' response keys.

pub mod headers;
mod upstream;

use bytes::Bytes;
use hyper::header::CONTENT_LENGTH;
use hyper::{Body, HeaderMap, Request, Response};
use jsonproxy_core::{CapabilityRecord, Error, MatchedRuleSet, Result};
use jsonproxy_filter::ResponseFilter;
use jsonproxy_security::{AuthorizationEngine, TokenCodec};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::responses::HttpResponse;

pub use upstream::{UpstreamClient, UpstreamResponse};

/// Per-request orchestration of token, rules, upstream and filter
#[derive(Debug, Clone)]
pub struct ProxyCore {
    codec: Arc<TokenCodec>,
    authorization: AuthorizationEngine,
    upstream: UpstreamClient,
}

impl ProxyCore {
    pub fn new(
        codec: Arc<TokenCodec>,
        authorization: AuthorizationEngine,
        upstream: UpstreamClient,
    ) -> Self {
        Self {
            codec,
            authorization,
            upstream,
        }
    }

    /// Proxy one request. Every failure becomes a response for this caller
    /// only.
    pub async fn handle(&self, req: Request<Body>, client_addr: SocketAddr) -> Response<Body> {
        match self.forward(req, client_addr).await {
            Ok(response) => response,
            Err(e) => HttpResponse::from_error(&e),
        }
    }

    /// Open the token carried in the Basic-Auth user field.
    ///
    /// Malformed tokens are reported as authentication failures.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<CapabilityRecord> {
        let token = headers::basic_auth_token(headers)?;

        self.codec.open(&token).map_err(|e| match e {
            Error::MalformedToken { reason } => Error::authentication(reason),
            other => other,
        })
    }

    async fn forward(&self, req: Request<Body>, client_addr: SocketAddr) -> Result<Response<Body>> {
        let (parts, body) = req.into_parts();

        let record = self.authenticate(&parts.headers)?;
        let url = self.upstream.resolve(
            parts
                .uri
                .path_and_query()
                .map_or(parts.uri.path(), |pq| pq.as_str()),
        )?;
        let matched = self
            .authorization
            .authorize(record.roles.as_slice(), url.path(), parts.method.as_str())?;
        let body = hyper::body::to_bytes(body)
            .await
            .map_err(|e| Error::invalid_request(format!("unable to read request body: {e}")))?;

        let mut outbound = parts.headers;
        headers::prepare_outbound(&mut outbound, &record.upstream_credential, client_addr.ip())?;

        let upstream = self.upstream.send(parts.method, url, outbound, body).await?;
        shape_response(upstream, &matched)
    }
}

/// Relay status and headers, filtering the body of successful responses.
///
/// Bodies of responses with status 300 or above, and empty bodies, are
/// relayed untouched.
fn shape_response(upstream: UpstreamResponse, matched: &MatchedRuleSet<'_>) -> Result<Response<Body>> {
    let UpstreamResponse {
        status,
        mut headers,
        body,
    } = upstream;

    headers::strip_hop_headers(&mut headers);

    let body = if status.as_u16() < 300 && !body.is_empty() {
        headers.remove(CONTENT_LENGTH);
        Bytes::from(ResponseFilter::new(matched).filter_body(&body)?)
    } else {
        debug!("Relaying {} response unfiltered", status);
        body
    };

    let mut response = Response::new(Body::from(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    Ok(response)
}
