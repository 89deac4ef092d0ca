//! Plaintext layout of a capability record.
//!
//! ```text
//! u32 big-endian unix seconds | (role bytes, 0x00)* | credential bytes
//! ```
//!
//! The credential is always the last NUL-separated part, so a record with no
//! roles is the timestamp followed directly by the credential.

use chrono::{DateTime, Utc};
use jsonproxy_core::{CapabilityRecord, Error, Result};

const TIMESTAMP_LEN: usize = 4;
const SEPARATOR: u8 = 0;

/// Serialize a record into token plaintext
pub fn encode(record: &CapabilityRecord) -> Result<Vec<u8>> {
    record.validate()?;

    let timestamp = u32::try_from(record.created_at.timestamp()).map_err(|_| {
        Error::invalid_record(format!(
            "creation time {} does not fit an unsigned 32-bit timestamp",
            record.created_at
        ))
    })?;

    let roles_len: usize = record.roles.iter().map(|r| r.len() + 1).sum();
    let mut buf =
        Vec::with_capacity(TIMESTAMP_LEN + roles_len + record.upstream_credential.len());

    buf.extend_from_slice(&timestamp.to_be_bytes());
    for role in &record.roles {
        buf.extend_from_slice(role.as_bytes());
        buf.push(SEPARATOR);
    }
    buf.extend_from_slice(record.upstream_credential.as_bytes());

    Ok(buf)
}

/// Parse token plaintext back into a record
pub fn decode(plaintext: &[u8]) -> Result<CapabilityRecord> {
    let (timestamp, rest) = match plaintext.split_first_chunk::<TIMESTAMP_LEN>() {
        Some((timestamp, rest)) => (u32::from_be_bytes(*timestamp), rest),
        None => return Err(Error::malformed_token("plaintext is shorter than the timestamp")),
    };

    let created_at = DateTime::<Utc>::from_timestamp(i64::from(timestamp), 0)
        .ok_or_else(|| Error::malformed_token("timestamp out of range"))?;

    let mut parts = rest
        .split(|b| *b == SEPARATOR)
        .map(|part| {
            String::from_utf8(part.to_vec())
                .map_err(|_| Error::malformed_token("record field is not valid UTF-8"))
        })
        .collect::<Result<Vec<_>>>()?;

    // `split` always yields at least one part: the credential
    let upstream_credential = parts.pop().unwrap_or_default();

    Ok(CapabilityRecord {
        created_at,
        roles: parts,
        upstream_credential,
    })
}
