//! HTTP response helpers
//!
//! Every response the proxy produces itself (as opposed to relaying from the
//! upstream) is built here, including the `proxy_error` envelope and the
//! mapping from [`Error`] to status codes.

use hyper::header::{HeaderValue, CACHE_CONTROL, CONTENT_TYPE};
use hyper::{Body, Response, StatusCode};
use jsonproxy_core::Error;
use serde::Serialize;
use tracing::{error, warn};

/// The only message a client ever sees for a 401
pub const UNAUTHORIZED_MESSAGE: &str = "You do not have permission to access this resource";

#[derive(Debug, Serialize)]
struct ErrorEnvelope<'a> {
    proxy_error: ProxyError<'a>,
}

#[derive(Debug, Serialize)]
struct ProxyError<'a> {
    code: &'a str,
    #[serde(skip_serializing_if = "str::is_empty")]
    message: &'a str,
}

/// HTTP response helper for proxy-generated responses
pub struct HttpResponse;

impl HttpResponse {
    /// Serialize `body` as a JSON response
    pub fn json(status: StatusCode, body: &impl Serialize) -> Response<Body> {
        match serde_json::to_vec(body) {
            Ok(bytes) => Self::build(status, "application/json", Body::from(bytes)),
            Err(e) => {
                error!("Unable to serialize response body: {}", e);
                Self::fallback()
            }
        }
    }

    /// Plain text response that must not be cached
    pub fn ok_text(body: &'static str) -> Response<Body> {
        let mut response = Self::build(StatusCode::OK, "text/plain", Body::from(body));
        response.headers_mut().insert(
            CACHE_CONTROL,
            HeaderValue::from_static("no-cache, no-store, must-revalidate"),
        );
        response
    }

    /// `{"proxy_error": {"code": ..., "message": ...}}` with `message` omitted
    /// when empty
    pub fn proxy_error(status: StatusCode, code: &str, message: &str) -> Response<Body> {
        Self::json(
            status,
            &ErrorEnvelope {
                proxy_error: ProxyError { code, message },
            },
        )
    }

    /// 404 `not_found`
    pub fn not_found(message: &str) -> Response<Body> {
        Self::proxy_error(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 401 `unauthorized` with the generic message
    pub fn unauthorized() -> Response<Body> {
        Self::proxy_error(
            StatusCode::UNAUTHORIZED,
            "unauthorized",
            UNAUTHORIZED_MESSAGE,
        )
    }

    /// Map a per-request failure to its client-facing response.
    ///
    /// Denials are logged with their cause and answered with the same generic
    /// 401, so a caller cannot tell a bad token from an unknown role or an
    /// unmatched rule.
    pub fn from_error(err: &Error) -> Response<Body> {
        if err.is_unauthorized() {
            warn!("Denied request: {}", err);
            return Self::unauthorized();
        }

        match err {
            Error::NotFound { .. } => Self::not_found(&err.to_string()),
            Error::InvalidRequest { message } => {
                Self::proxy_error(StatusCode::NOT_FOUND, "invalid_request", message)
            }
            Error::Upstream { .. } => {
                error!("{}", err);
                Self::proxy_error(
                    StatusCode::BAD_GATEWAY,
                    "upstream_error",
                    "Unable to reach the upstream API",
                )
            }
            _ => {
                error!("Request failed: {}", err);
                Self::proxy_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "Internal server error",
                )
            }
        }
    }

    fn build(status: StatusCode, content_type: &'static str, body: Body) -> Response<Body> {
        let mut response = Response::new(body);
        *response.status_mut() = status;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
        response
    }

    fn fallback() -> Response<Body> {
        let mut response = Response::new(Body::from("Internal server error"));
        *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
        response
    }
}
