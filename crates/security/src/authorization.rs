//! Role resolution and request authorization

use jsonproxy_core::{Error, MatchedRuleSet, Result, RoleRegistry};
use std::sync::Arc;
use tracing::debug;

/// Resolves a token's roles into the rules that apply to one request
#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
    /// Registry shared with the issuance API
    registry: Arc<RoleRegistry>,
}

impl AuthorizationEngine {
    /// Create a new engine over a loaded registry
    pub fn new(registry: Arc<RoleRegistry>) -> Self {
        Self { registry }
    }

    /// Collect every rule of the given roles whose path pattern matches `path`
    /// and whose methods cover `method`.
    ///
    /// Fails closed: a single unknown role rejects the whole request, even if
    /// the remaining roles would have matched. An empty result is rejected too.
    pub fn authorize<S: AsRef<str>>(
        &self,
        roles: &[S],
        path: &str,
        method: &str,
    ) -> Result<MatchedRuleSet<'_>> {
        let mut matched = MatchedRuleSet::new();

        for role in roles {
            let role = role.as_ref();
            let rules = self
                .registry
                .get(role)
                .ok_or_else(|| Error::forbidden(format!("role {role} does not exist")))?;

            for (pattern, rule) in rules.iter() {
                if pattern.matches(path) && rule.methods.permits(method) {
                    debug!("Role {} granted {} {} via '{}'", role, method, path, pattern);
                    matched.insert(rule);
                }
            }
        }

        if matched.is_empty() {
            return Err(Error::forbidden(format!(
                "no rule permits {method} {path}"
            )));
        }

        Ok(matched)
    }
}
