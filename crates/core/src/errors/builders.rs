//! Builder methods for creating errors with context

use super::types::Error;

// Helper methods for creating errors with context
impl Error {
    /// Create a configuration error
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
        }
    }

    /// Create a malformed token error
    #[must_use]
    pub fn malformed_token(reason: impl Into<String>) -> Self {
        Error::MalformedToken {
            reason: reason.into(),
        }
    }

    /// Create an authentication error
    #[must_use]
    pub fn authentication(reason: impl Into<String>) -> Self {
        Error::Authentication {
            reason: reason.into(),
        }
    }

    /// Create a forbidden error
    #[must_use]
    pub fn forbidden(reason: impl Into<String>) -> Self {
        Error::Forbidden {
            reason: reason.into(),
        }
    }

    /// Create an invalid record error
    #[must_use]
    pub fn invalid_record(reason: impl Into<String>) -> Self {
        Error::InvalidRecord {
            reason: reason.into(),
        }
    }

    /// Create a not found error for a named resource
    #[must_use]
    pub fn not_found(resource: impl Into<String>, name: impl Into<String>) -> Self {
        Error::NotFound {
            resource: resource.into(),
            name: name.into(),
        }
    }

    /// Create an invalid request error
    #[must_use]
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Error::InvalidRequest {
            message: message.into(),
        }
    }

    /// Create an upstream transport error
    #[must_use]
    pub fn upstream(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Upstream {
            endpoint: endpoint.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error with context
    #[must_use]
    pub fn serialization(message: impl Into<String>, source: serde_json::Error) -> Self {
        Error::Serialization {
            message: message.into(),
            source,
        }
    }
}
