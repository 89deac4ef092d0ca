//! Core error type definitions

/// Result type alias for jsonproxy operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for jsonproxy operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid process configuration: secret, role registry or upstream URL.
    /// Fatal at startup.
    Configuration { message: String },

    /// Token bytes that cannot be split into nonce and ciphertext, or whose
    /// plaintext does not follow the record layout
    MalformedToken { reason: String },

    /// Credential missing, undecodable, or failing AEAD authentication
    Authentication { reason: String },

    /// Unknown role or no rule matching the request
    Forbidden { reason: String },

    /// Every sealing attempt produced the transport delimiter
    Generation { attempts: usize },

    /// Capability record that cannot be serialized into a token
    InvalidRecord { reason: String },

    /// A named resource does not exist
    NotFound { resource: String, name: String },

    /// Request body could not be understood
    InvalidRequest { message: String },

    /// Transport failure talking to the upstream API
    Upstream { endpoint: String, message: String },

    /// JSON parsing or serialization errors
    Serialization {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

impl Error {
    /// Whether this error is one of the failures surfaced to proxy clients as
    /// a uniform 401.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Error::MalformedToken { .. } | Error::Authentication { .. } | Error::Forbidden { .. }
        )
    }
}
