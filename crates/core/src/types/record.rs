//! Capability records carried inside tokens

use crate::errors::{Error, Result};
use chrono::{DateTime, SubsecRound, Utc};

/// The set of roles bound to an upstream credential.
///
/// A record only exists in plaintext while a token is being generated or
/// right after it has been opened; the token itself is the persisted form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityRecord {
    /// Issuance time, second precision
    pub created_at: DateTime<Utc>,
    /// Role names granted by the token, in issuance order
    pub roles: Vec<String>,
    /// Credential forwarded to the upstream API
    pub upstream_credential: String,
}

impl CapabilityRecord {
    /// Create a record issued now
    #[must_use]
    pub fn new(roles: Vec<String>, upstream_credential: impl Into<String>) -> Self {
        Self::issued_at(Utc::now(), roles, upstream_credential)
    }

    /// Create a record with an explicit issuance time, truncated to whole seconds
    #[must_use]
    pub fn issued_at(
        created_at: DateTime<Utc>,
        roles: Vec<String>,
        upstream_credential: impl Into<String>,
    ) -> Self {
        Self {
            created_at: created_at.trunc_subsecs(0),
            roles,
            upstream_credential: upstream_credential.into(),
        }
    }

    /// Check the invariants the token layout relies on: role names are
    /// non-empty and neither roles nor the credential contain NUL bytes.
    pub fn validate(&self) -> Result<()> {
        for role in &self.roles {
            if role.is_empty() {
                return Err(Error::invalid_record("role names must not be empty"));
            }
            if role.contains('\0') {
                return Err(Error::invalid_record(format!(
                    "role name {role:?} contains a NUL byte"
                )));
            }
        }

        if self.upstream_credential.contains('\0') {
            return Err(Error::invalid_record(
                "upstream credential contains a NUL byte",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    #[test]
    fn test_issued_at_truncates_to_seconds() {
        let at = Utc.timestamp_opt(1_700_000_000, 987_654_321).unwrap();
        let record = CapabilityRecord::issued_at(at, vec!["reader".into()], "key");

        assert_eq!(record.created_at.timestamp(), 1_700_000_000);
        assert_eq!(record.created_at.nanosecond(), 0);
    }

    #[test]
    fn test_validate_accepts_zero_roles() {
        let record = CapabilityRecord::new(vec![], "secret");
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_nul_and_empty_roles() {
        let nul_role = CapabilityRecord::new(vec!["a\0b".into()], "secret");
        assert!(matches!(
            nul_role.validate(),
            Err(Error::InvalidRecord { .. })
        ));

        let empty_role = CapabilityRecord::new(vec![String::new()], "secret");
        assert!(matches!(
            empty_role.validate(),
            Err(Error::InvalidRecord { .. })
        ));

        let nul_credential = CapabilityRecord::new(vec!["reader".into()], "se\0cret");
        assert!(matches!(
            nul_credential.validate(),
            Err(Error::InvalidRecord { .. })
        ));
    }
}
