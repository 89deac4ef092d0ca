//! Capability tokens
//!
//! A token is the only persisted form of a [`CapabilityRecord`]: the record is
//! serialized, sealed with AES-GCM under a fresh nonce, and handed to the client.
//! Opening a token either authenticates the whole record or fails; a forged or
//! corrupted token never yields partial plaintext.
//!
//! [`CapabilityRecord`]: jsonproxy_core::CapabilityRecord

mod codec;
pub mod wire;

pub use codec::{TokenCodec, MAX_SEAL_ATTEMPTS, NONCE_SIZE, TOKEN_DELIMITER};
