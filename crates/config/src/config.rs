//! Process settings and their validated form

use crate::loader::load_role_registry;
use clap::Args;
use jsonproxy_core::{Error, Result, RoleRegistry};
use rand::RngCore;
use std::net::{SocketAddr, ToSocketAddrs};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use url::Url;

/// Prefix shared by every environment variable
pub const ENV_PREFIX: &str = "JSONPROXY";

/// Upstream timeout applied when none is configured
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 30;

/// Length of the secret generated when none is supplied
const GENERATED_SECRET_LEN: usize = 16;

/// Raw settings as given on the command line or in the environment
#[derive(Debug, Clone, Args)]
pub struct Settings {
    /// Address the proxy binds to
    #[arg(long, env = "JSONPROXY_BINDADDR", default_value = "127.0.0.1")]
    pub bind_addr: String,

    /// Port the proxy binds to
    #[arg(long, env = "JSONPROXY_PORT", default_value_t = 8080)]
    pub port: u16,

    /// URL path prefix of the key issuance API. Requests under this prefix
    /// are not proxied.
    #[arg(long, env = "JSONPROXY_API_PREFIX", default_value = "jsonproxy")]
    pub api_prefix: String,

    /// Hex-encoded AES key of 16, 24 or 32 bytes used to seal tokens
    #[arg(
        long,
        env = "JSONPROXY_SECRET",
        default_value = "",
        hide_env_values = true,
        hide_default_value = true
    )]
    pub secret: String,

    /// JSON file describing the available roles
    #[arg(long, env = "JSONPROXY_ROLE_FILE", default_value = "test-roles.json")]
    pub role_file: PathBuf,

    /// Base URL of the upstream API
    #[arg(long, env = "JSONPROXY_UPSTREAM_URL")]
    pub upstream_url: String,

    /// Seconds to wait for the upstream API before failing the request
    #[arg(long, env = "JSONPROXY_UPSTREAM_TIMEOUT", default_value_t = DEFAULT_UPSTREAM_TIMEOUT_SECS)]
    pub upstream_timeout: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, env = "JSONPROXY_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

/// Validated configuration the server is built from
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Socket address to listen on
    pub listen_addr: SocketAddr,
    /// Issuance API prefix without surrounding slashes
    pub api_prefix: String,
    /// Raw AES key bytes
    pub secret: Vec<u8>,
    /// Loaded role registry
    pub registry: RoleRegistry,
    /// Base URL requests are resolved against
    pub upstream_url: Url,
    /// Per-request upstream timeout
    pub upstream_timeout: Duration,
}

impl Settings {
    /// Validate every setting and load the role registry
    pub fn resolve(&self) -> Result<ProxyConfig> {
        Ok(ProxyConfig {
            listen_addr: self.listen_addr()?,
            api_prefix: normalize_prefix(&self.api_prefix)?,
            secret: self.secret_key()?,
            registry: load_role_registry(&self.role_file)?,
            upstream_url: parse_upstream_url(&self.upstream_url)?,
            upstream_timeout: Duration::from_secs(self.upstream_timeout),
        })
    }

    /// Resolve the bind address and port into a socket address
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        (self.bind_addr.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| {
                Error::configuration(format!(
                    "invalid bind address {}:{}: {e}",
                    self.bind_addr, self.port
                ))
            })?
            .next()
            .ok_or_else(|| {
                Error::configuration(format!(
                    "bind address {} did not resolve",
                    self.bind_addr
                ))
            })
    }

    /// Decode the hex secret, or generate a random one when none is set.
    ///
    /// Length is checked by the token codec, which knows the valid AES key sizes.
    pub fn secret_key(&self) -> Result<Vec<u8>> {
        let secret = self.secret.trim();
        if secret.is_empty() {
            warn!(
                "No secret configured; generating a random one. Issued keys will not survive a restart. \
                 Supply a hex encoded secret of 16, 24 or 32 bytes via {}_SECRET.",
                ENV_PREFIX
            );
            let mut key = vec![0u8; GENERATED_SECRET_LEN];
            rand::thread_rng().fill_bytes(&mut key);
            return Ok(key);
        }

        hex::decode(secret)
            .map_err(|e| Error::configuration(format!("secret is not valid hex: {e}")))
    }
}

fn normalize_prefix(prefix: &str) -> Result<String> {
    let trimmed = prefix.trim_matches('/');
    if trimmed.is_empty() {
        return Err(Error::configuration("API prefix must not be empty"));
    }
    Ok(trimmed.to_string())
}

fn parse_upstream_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw)
        .map_err(|e| Error::configuration(format!("invalid upstream URL '{raw}': {e}")))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        scheme => Err(Error::configuration(format!(
            "upstream URL must use http or https, got '{scheme}'"
        ))),
    }
}
