//! Header rewriting between the client and the upstream API

use base64::{engine::general_purpose::STANDARD, Engine as _};
use hyper::header::{
    HeaderName, HeaderValue, AUTHORIZATION, CONNECTION, CONTENT_LENGTH, HOST,
};
use hyper::HeaderMap;
use jsonproxy_core::{Error, Result};
use std::net::IpAddr;

/// Headers that describe a single connection and are never relayed
pub const HOP_HEADERS: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "te",
    "trailers",
    "transfer-encoding",
    "upgrade",
];

const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Remove hop-by-hop headers, including any extra ones named by `Connection`
pub fn strip_hop_headers(headers: &mut HeaderMap) {
    let listed: Vec<HeaderName> = headers
        .get_all(CONNECTION)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|name| HeaderName::from_bytes(name.trim().as_bytes()).ok())
        .collect();

    for name in listed {
        headers.remove(name);
    }
    for name in HOP_HEADERS {
        headers.remove(name);
    }
}

/// Append the client address to `X-Forwarded-For`, joining any prior
/// values with `", "`
pub fn append_forwarded_for(headers: &mut HeaderMap, client_ip: IpAddr) {
    let mut chain: Vec<String> = headers
        .get_all(X_FORWARDED_FOR)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(str::to_string)
        .collect();
    chain.push(client_ip.to_string());

    if let Ok(value) = HeaderValue::from_str(&chain.join(", ")) {
        headers.insert(HeaderName::from_static(X_FORWARDED_FOR), value);
    }
}

/// `Basic base64(user ":")`, the form the upstream expects its key in
pub fn basic_auth_value(user: &str) -> Result<HeaderValue> {
    let encoded = STANDARD.encode(format!("{user}:"));
    HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| Error::invalid_record(format!("credential is not a valid header: {e}")))
}

/// Extract the raw token bytes from the Basic-Auth user field.
///
/// The header carries `base64(token ":" password)`; the password is ignored
/// and the token itself may be arbitrary bytes other than `:`.
pub fn basic_auth_token(headers: &HeaderMap) -> Result<Vec<u8>> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or_else(|| Error::authentication("missing Authorization header"))?
        .to_str()
        .map_err(|_| Error::authentication("Authorization header is not ASCII"))?;

    let (scheme, encoded) = value
        .split_once(' ')
        .ok_or_else(|| Error::authentication("Authorization header has no scheme"))?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return Err(Error::authentication(format!(
            "unsupported authorization scheme {scheme}"
        )));
    }

    let mut decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::authentication(format!("credentials are not base64: {e}")))?;
    let split = decoded
        .iter()
        .position(|byte| *byte == b':')
        .ok_or_else(|| Error::authentication("credentials have no ':' separator"))?;

    decoded.truncate(split);
    Ok(decoded)
}

/// Rewrite inbound request headers for the upstream round trip
pub fn prepare_outbound(
    headers: &mut HeaderMap,
    upstream_credential: &str,
    client_ip: IpAddr,
) -> Result<()> {
    strip_hop_headers(headers);
    headers.remove(HOST);
    headers.remove(CONTENT_LENGTH);
    headers.remove(AUTHORIZATION);

    headers.insert(AUTHORIZATION, basic_auth_value(upstream_credential)?);
    append_forwarded_for(headers, client_ip);
    Ok(())
}
