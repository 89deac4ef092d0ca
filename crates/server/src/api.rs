//! Key issuance API

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hyper::{Body, Method, Request, Response, StatusCode};
use jsonproxy_core::{CapabilityRecord, Error, Result, RoleRegistry};
use jsonproxy_security::TokenCodec;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::responses::HttpResponse;

/// Body of `POST /{prefix}/keys`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeyRequest {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub api_key: String,
}

/// A freshly issued key. `key` is the base64 of the raw token, which clients
/// decode before placing it in the Basic-Auth user field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedKey {
    pub key: String,
    pub roles: Vec<String>,
    pub api_key: String,
}

/// Issues capability tokens for roles known to the registry
#[derive(Debug, Clone)]
pub struct KeyIssuer {
    codec: Arc<TokenCodec>,
    registry: Arc<RoleRegistry>,
}

impl KeyIssuer {
    pub fn new(codec: Arc<TokenCodec>, registry: Arc<RoleRegistry>) -> Self {
        Self { codec, registry }
    }

    /// Bind `roles` to `api_key` in a new token.
    ///
    /// Every role must exist; the first unknown one fails the whole request.
    /// A record that could not be sealed is a bad request, not a server fault.
    pub fn issue_token(&self, roles: Vec<String>, api_key: String) -> Result<IssuedKey> {
        if let Some(missing) = roles.iter().find(|role| !self.registry.contains(role)) {
            return Err(Error::not_found("Role", missing.as_str()));
        }

        let record = CapabilityRecord::new(roles, api_key);
        record
            .validate()
            .map_err(|e| Error::invalid_request(e.to_string()))?;
        let token = self.codec.generate(&record)?;
        info!("Issued key for roles [{}]", record.roles.join(", "));

        Ok(IssuedKey {
            key: STANDARD.encode(token),
            roles: record.roles,
            api_key: record.upstream_credential,
        })
    }

    /// Dispatch a request whose path has had the API prefix removed
    pub async fn handle(&self, req: Request<Body>, path: &str) -> Response<Body> {
        match (req.method(), path) {
            (&Method::POST, "/keys") => match self.create_key(req).await {
                Ok(issued) => HttpResponse::json(StatusCode::OK, &issued),
                Err(e) => HttpResponse::from_error(&e),
            },
            _ => HttpResponse::not_found(""),
        }
    }

    async fn create_key(&self, req: Request<Body>) -> Result<IssuedKey> {
        let body = hyper::body::to_bytes(req.into_body())
            .await
            .map_err(|_| Error::invalid_request("Unable to read body."))?;
        let request: KeyRequest = serde_json::from_slice(&body)
            .map_err(|_| Error::invalid_request("Unable to parse body as JSON."))?;

        self.issue_token(request.roles, request.api_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> KeyIssuer {
        let registry = RoleRegistry::from_json(
            r#"{"reader": {"/items/*": {"methods": ["GET"], "response_keys": ["id"]}}, "writer": {}}"#,
        )
        .unwrap();
        let codec = TokenCodec::new(&[7u8; 32]).unwrap();
        KeyIssuer::new(Arc::new(codec), Arc::new(registry))
    }

    #[test]
    fn test_issued_key_opens_to_the_same_record() {
        let issuer = issuer();
        let issued = issuer
            .issue_token(vec!["reader".into(), "writer".into()], "upstream-key".into())
            .unwrap();

        assert_eq!(issued.roles, vec!["reader", "writer"]);
        assert_eq!(issued.api_key, "upstream-key");

        let token = STANDARD.decode(&issued.key).unwrap();
        assert!(!token.contains(&b':'));

        let record = issuer.codec.open(&token).unwrap();
        assert_eq!(record.roles, issued.roles);
        assert_eq!(record.upstream_credential, "upstream-key");
    }

    #[test]
    fn test_unknown_role_is_not_found() {
        let err = issuer()
            .issue_token(vec!["reader".into(), "ghost".into()], "key".into())
            .unwrap_err();

        assert!(matches!(
            err,
            Error::NotFound { ref resource, ref name } if resource == "Role" && name == "ghost"
        ));
    }

    #[test]
    fn test_nul_in_api_key_is_invalid_request() {
        let err = issuer()
            .issue_token(vec!["reader".into()], "up\0stream".into())
            .unwrap_err();

        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn test_nul_in_registered_role_is_invalid_request() {
        let registry = RoleRegistry::from_json(r#"{"bad\u0000role": {}}"#).unwrap();
        let codec = TokenCodec::new(&[7u8; 32]).unwrap();
        let issuer = KeyIssuer::new(Arc::new(codec), Arc::new(registry));

        let err = issuer
            .issue_token(vec!["bad\0role".into()], "key".into())
            .unwrap_err();

        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn test_no_roles_is_allowed() {
        let issued = issuer().issue_token(vec![], "key".into()).unwrap();
        assert!(issued.roles.is_empty());
    }
}
