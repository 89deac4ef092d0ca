//! Core domain types and errors for `jsonproxy`.
//!
//! This crate holds the pieces every other crate agrees on:
//!
//! - **`errors`**: the `Error` enum and `Result` alias covering configuration,
//!   token, authorization, upstream and serialization failures.
//! - **`types`**: `CapabilityRecord`, the role registry and its rules, and the
//!   per-request `MatchedRuleSet`.
//! - **`pattern`**: the single-segment glob matcher used both for request paths
//!   and for JSON key-paths.

pub mod errors;
pub mod pattern;
pub mod types;

pub use self::{
    errors::{Error, Result},
    pattern::Pattern,
    types::*,
};
