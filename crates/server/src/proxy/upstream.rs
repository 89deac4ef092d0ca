//! Upstream round trip

use bytes::Bytes;
use hyper::{HeaderMap, Method, StatusCode, Version};
use jsonproxy_core::{Error, Result};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Response read in full from the upstream API
#[derive(Debug)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTP/1.1 client bound to the upstream base URL
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    base_url: Url,
}

impl UpstreamClient {
    /// Build the client once; it is shared by every request.
    ///
    /// Redirects are relayed to the caller rather than followed.
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .http1_only()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| Error::configuration(format!("unable to build upstream client: {e}")))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an inbound path and query against the base URL.
    ///
    /// Only canonical paths are accepted, and the resolved URL must keep the
    /// base origin and the exact inbound path, so the path that gets
    /// authorized is the path the upstream receives.
    pub fn resolve(&self, path_and_query: &str) -> Result<Url> {
        let path = path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path);
        ensure_canonical(path)?;

        let url = self
            .base_url
            .join(path_and_query)
            .map_err(|e| Error::upstream(self.base_url.as_str(), format!("invalid path: {e}")))?;

        if url.origin() != self.base_url.origin() {
            return Err(Error::forbidden(format!("path {path} leaves the upstream origin")));
        }
        if url.path() != path {
            return Err(Error::forbidden(format!(
                "path {path} resolves to {}",
                url.path()
            )));
        }

        Ok(url)
    }

    /// Perform exactly one round trip. No retries.
    pub async fn send(
        &self,
        method: Method,
        url: Url,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<UpstreamResponse> {
        debug!("Forwarding {} {}", method, url);

        let response = self
            .client
            .request(method, url.clone())
            .version(Version::HTTP_11)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::upstream(url.as_str(), e.to_string()))?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|e| Error::upstream(url.as_str(), format!("unable to read body: {e}")))?;

        debug!("Upstream answered {} with {} bytes", status, body.len());

        Ok(UpstreamResponse {
            status,
            headers,
            body,
        })
    }
}

/// Reject paths the URL parser or the upstream would rewrite: dot segments
/// (plain or percent-encoded), encoded separators, backslashes and empty
/// interior segments.
fn ensure_canonical(path: &str) -> Result<()> {
    let reject = |reason: &str| Err(Error::forbidden(format!("path {path} {reason}")));

    if !path.starts_with('/') {
        return reject("is not absolute");
    }
    if path.contains('\\') {
        return reject("contains a backslash");
    }

    let lowered = path.to_ascii_lowercase();
    if lowered.contains("%2f") || lowered.contains("%5c") {
        return reject("contains an encoded separator");
    }

    let segments: Vec<&str> = lowered[1..].split('/').collect();
    let last = segments.len() - 1;
    for (index, segment) in segments.iter().enumerate() {
        if segment.is_empty() && index != last {
            return reject("contains an empty segment");
        }
        if matches!(segment.replace("%2e", ".").as_str(), "." | "..") {
            return reject("contains a dot segment");
        }
    }

    Ok(())
}
