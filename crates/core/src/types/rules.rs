//! Role rules: permitted methods and response key patterns per path pattern

use crate::pattern::Pattern;
use indexmap::IndexMap;
use serde::Deserialize;

/// HTTP methods permitted by a rule
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "Vec<String>")]
pub enum MethodSet {
    /// The `"*"` wildcard: every method
    Any,
    /// Exactly these method names (compared case-sensitively)
    Only(Vec<String>),
}

impl MethodSet {
    /// Whether the method is covered by this set
    #[must_use]
    pub fn permits(&self, method: &str) -> bool {
        match self {
            MethodSet::Any => true,
            MethodSet::Only(methods) => methods.iter().any(|m| m == method),
        }
    }
}

impl Default for MethodSet {
    fn default() -> Self {
        MethodSet::Only(Vec::new())
    }
}

impl From<Vec<String>> for MethodSet {
    fn from(methods: Vec<String>) -> Self {
        if methods.iter().any(|m| m == "*") {
            MethodSet::Any
        } else {
            MethodSet::Only(methods)
        }
    }
}

impl<const N: usize> From<[&str; N]> for MethodSet {
    fn from(methods: [&str; N]) -> Self {
        methods
            .iter()
            .map(|m| (*m).to_string())
            .collect::<Vec<_>>()
            .into()
    }
}

/// How the proxy treats requests whose path matched one pattern
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Rule {
    /// Methods allowed for the pattern
    #[serde(default)]
    pub methods: MethodSet,
    /// Key-path patterns whitelisted in the JSON response
    #[serde(default)]
    pub response_keys: Vec<Pattern>,
}

impl Rule {
    /// Create a rule from methods and compiled key patterns
    #[must_use]
    pub fn new(methods: impl Into<MethodSet>, response_keys: Vec<Pattern>) -> Self {
        Self {
            methods: methods.into(),
            response_keys,
        }
    }

    /// Whether any response key pattern of this rule matches the key-path
    #[must_use]
    pub fn permits_key(&self, key_path: &str) -> bool {
        self.response_keys.iter().any(|p| p.matches(key_path))
    }
}

/// Path pattern to rule table for a single role, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct RoleRules {
    rules: IndexMap<Pattern, Rule>,
}

impl RoleRules {
    /// Create an empty rule table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Iterate over `(path pattern, rule)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (&Pattern, &Rule)> {
        self.rules.iter()
    }

    /// Number of path patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the table has no patterns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl FromIterator<(Pattern, Rule)> for RoleRules {
    fn from_iter<I: IntoIterator<Item = (Pattern, Rule)>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_wildcard() {
        let any: MethodSet = vec!["GET".to_string(), "*".to_string()].into();
        assert_eq!(any, MethodSet::Any);
        assert!(any.permits("DELETE"));

        let get_only = MethodSet::from(["GET"]);
        assert!(get_only.permits("GET"));
        assert!(!get_only.permits("POST"));
        assert!(!get_only.permits("get"));

        assert!(!MethodSet::default().permits("GET"));
    }

    #[test]
    fn test_rule_deserialization() {
        let rule: Rule = serde_json::from_str(
            r#"{"methods": ["GET", "POST"], "response_keys": ["id", "jobs/*"]}"#,
        )
        .unwrap();

        assert!(rule.methods.permits("POST"));
        assert!(rule.permits_key("id"));
        assert!(rule.permits_key("jobs/name"));
        assert!(!rule.permits_key("secret"));
    }

    #[test]
    fn test_rule_fields_default_to_empty() {
        let rule: Rule = serde_json::from_str("{}").unwrap();
        assert!(!rule.methods.permits("GET"));
        assert!(rule.response_keys.is_empty());
    }

    #[test]
    fn test_role_rules_keep_declaration_order() {
        let rules: RoleRules = serde_json::from_str(
            r#"{
                "/b/*": {"methods": ["GET"]},
                "/a/*": {"methods": ["*"]}
            }"#,
        )
        .unwrap();

        let patterns: Vec<_> = rules.iter().map(|(p, _)| p.as_str()).collect();
        assert_eq!(patterns, vec!["/b/*", "/a/*"]);
        assert_eq!(rules.len(), 2);
    }

    #[test]
    fn test_malformed_pattern_fails_deserialization() {
        let result: Result<RoleRules, _> =
            serde_json::from_str(r#"{"/items/[0-9": {"methods": ["GET"]}}"#);
        assert!(result.is_err());
    }
}
