#![allow(dead_code)]

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hyper::header::{AUTHORIZATION, CONTENT_TYPE};
use hyper::{Body, Request, Response};
use jsonproxy_config::ProxyConfig;
use jsonproxy_core::RoleRegistry;
use jsonproxy_server::{IssuedKey, ProxyServer};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use url::Url;

pub const SECRET: [u8; 32] = [0x42; 32];

pub const ROLES: &str = r#"{
    "candidates": {
        "/candidates/*": {"methods": ["GET"], "response_keys": ["id", "jobs", "jobs/*"]},
        "/candidates/*/*/*": {"methods": ["GET", "POST"], "response_keys": ["name/first"]}
    }
}"#;

pub const CANDIDATE: &str = r#"{"id":123,"secret":"stuff","jobs":[{"name":"me","day":"night"},{"other":"stuff"}],"name":{"first":"Mister","last":"T"}}"#;

pub fn client_addr() -> SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

pub fn config(upstream: &str) -> ProxyConfig {
    ProxyConfig {
        listen_addr: "127.0.0.1:0".parse().unwrap(),
        api_prefix: "jsonproxy".to_string(),
        secret: SECRET.to_vec(),
        registry: RoleRegistry::from_json(ROLES).unwrap(),
        upstream_url: Url::parse(upstream).unwrap(),
        upstream_timeout: Duration::from_secs(5),
    }
}

pub fn server(upstream: &str) -> ProxyServer {
    jsonproxy_server::build(config(upstream)).unwrap()
}

pub async fn send(server: &ProxyServer, req: Request<Body>) -> Response<Body> {
    server.handle_request(req, client_addr()).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    hyper::body::to_bytes(response.into_body())
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Issue a key through the API and return the raw token bytes
pub async fn issue(server: &ProxyServer, roles: &[&str], api_key: &str) -> Vec<u8> {
    let req = Request::post("/jsonproxy/keys")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"roles": roles, "api_key": api_key}).to_string(),
        ))
        .unwrap();

    let issued: IssuedKey = serde_json::from_value(body_json(send(server, req).await).await).unwrap();
    STANDARD.decode(issued.key).unwrap()
}

/// `Authorization` value carrying `token` in the Basic-Auth user field
pub fn basic_auth(token: &[u8]) -> String {
    let mut credentials = token.to_vec();
    credentials.push(b':');
    format!("Basic {}", STANDARD.encode(credentials))
}

pub fn request(method: &str, path: &str, token: &[u8]) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(path)
        .header(AUTHORIZATION, basic_auth(token))
        .body(Body::empty())
        .unwrap()
}
