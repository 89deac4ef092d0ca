//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::MalformedToken { reason } => {
                write!(f, "malformed token: {reason}")
            }
            Error::Authentication { reason } => {
                write!(f, "authentication failed: {reason}")
            }
            Error::Forbidden { reason } => {
                write!(f, "forbidden: {reason}")
            }
            Error::Generation { attempts } => {
                write!(
                    f,
                    "failed to generate a token without delimiter bytes after {attempts} attempts"
                )
            }
            Error::InvalidRecord { reason } => {
                write!(f, "invalid capability record: {reason}")
            }
            Error::NotFound { resource, name } => {
                write!(f, "{resource} {name} does not exist")
            }
            Error::InvalidRequest { message } => {
                write!(f, "invalid request: {message}")
            }
            Error::Upstream { endpoint, message } => {
                write!(f, "upstream request to '{endpoint}' failed: {message}")
            }
            Error::Serialization { message, .. } => {
                write!(f, "JSON error: {message}")
            }
        }
    }
}
