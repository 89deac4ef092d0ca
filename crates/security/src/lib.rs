//! Security features for jsonproxy
//!
//! This crate provides:
//! - Capability tokens: AES-GCM sealed records binding roles to an upstream
//!   credential, shaped so they can travel in the user field of HTTP Basic auth
//! - Role authorization: resolving a token's roles against the registry for a
//!   request path and method, failing closed

pub mod authorization;
pub mod token;

pub use authorization::AuthorizationEngine;
pub use token::{TokenCodec, MAX_SEAL_ATTEMPTS, NONCE_SIZE, TOKEN_DELIMITER};
