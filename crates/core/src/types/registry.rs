//! The role registry loaded once at startup

use super::rules::RoleRules;
use crate::errors::{Error, Result};
use serde::Deserialize;
use std::collections::HashMap;

/// Read-only mapping from role name to its rule table.
///
/// There are no mutating methods: a registry is built in one piece and then
/// shared behind an `Arc` for the lifetime of the process.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RoleRegistry {
    roles: HashMap<String, RoleRules>,
}

impl RoleRegistry {
    /// Parse a registry from its JSON document form
    pub fn from_json(source: &str) -> Result<Self> {
        serde_json::from_str(source)
            .map_err(|e| Error::configuration(format!("unable to parse role registry: {e}")))
    }

    /// Look up a role's rules
    #[must_use]
    pub fn get(&self, role: &str) -> Option<&RoleRules> {
        self.roles.get(role)
    }

    /// Whether a role with this name exists
    #[must_use]
    pub fn contains(&self, role: &str) -> bool {
        self.roles.contains_key(role)
    }

    /// Number of roles
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Whether the registry has no roles
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl FromIterator<(String, RoleRules)> for RoleRegistry {
    fn from_iter<I: IntoIterator<Item = (String, RoleRules)>>(iter: I) -> Self {
        Self {
            roles: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"{
        "candidates": {
            "/candidates/*": {"methods": ["GET"], "response_keys": ["id", "jobs", "jobs/*"]},
            "/candidates/*/*/*": {"methods": ["GET", "POST"], "response_keys": ["name/first"]}
        },
        "empty": {}
    }"#;

    #[test]
    fn test_from_json() {
        let registry = RoleRegistry::from_json(REGISTRY).unwrap();

        assert_eq!(registry.len(), 2);
        assert!(registry.contains("candidates"));
        assert!(registry.contains("empty"));
        assert!(!registry.contains("admin"));
        assert_eq!(registry.get("candidates").map(RoleRules::len), Some(2));
        assert!(registry.get("empty").is_some_and(RoleRules::is_empty));
    }

    #[test]
    fn test_from_json_rejects_invalid_documents() {
        for source in [
            "not json",
            r#"["candidates"]"#,
            r#"{"r": {"/x": {"methods": "GET"}}}"#,
            r#"{"r": {"/x/[": {"methods": ["GET"]}}}"#,
        ] {
            let err = RoleRegistry::from_json(source).unwrap_err();
            assert!(
                matches!(err, Error::Configuration { .. }),
                "expected configuration error for {source}"
            );
        }
    }
}
