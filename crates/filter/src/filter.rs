//! Recursive key-path filter over parsed JSON

use jsonproxy_core::{Error, MatchedRuleSet, Result};
use serde_json::{Map, Value};
use tracing::debug;

const KEY_SEPARATOR: char = '/';

/// Prunes JSON values down to the key-paths whitelisted by a request's
/// matched rules
#[derive(Debug, Clone, Copy)]
pub struct ResponseFilter<'r, 'a> {
    rules: &'r MatchedRuleSet<'a>,
}

impl<'r, 'a> ResponseFilter<'r, 'a> {
    /// Create a filter for the rules matched by one request
    #[must_use]
    pub fn new(rules: &'r MatchedRuleSet<'a>) -> Self {
        Self { rules }
    }

    /// Filter a whole document.
    ///
    /// When nothing survives, an object becomes `{}`, an array `[]` and a
    /// scalar `null`, so the response is still well-formed JSON and never
    /// leaks the dropped value.
    #[must_use]
    pub fn filter(&self, value: Value) -> Value {
        let empty = match &value {
            Value::Object(_) => Value::Object(Map::new()),
            Value::Array(_) => Value::Array(Vec::new()),
            _ => Value::Null,
        };

        self.retain(value).unwrap_or(empty)
    }

    /// Filter a value rooted at the empty key-path, returning `None` when it
    /// is dropped entirely
    #[must_use]
    pub fn retain(&self, value: Value) -> Option<Value> {
        let mut key_path = String::new();
        self.retain_at(value, &mut key_path)
    }

    /// Parse, filter and re-serialize a JSON body
    pub fn filter_body(&self, body: &[u8]) -> Result<Vec<u8>> {
        let parsed: Value = serde_json::from_slice(body)
            .map_err(|e| Error::serialization("upstream body is not valid JSON", e))?;

        Ok(serde_json::to_vec(&self.filter(parsed))?)
    }

    fn retain_at(&self, value: Value, key_path: &mut String) -> Option<Value> {
        match value {
            Value::Array(items) if !items.is_empty() => {
                // Elements share the array's key-path
                let kept: Vec<Value> = items
                    .into_iter()
                    .filter_map(|item| self.retain_at(item, key_path))
                    .collect();

                (!kept.is_empty()).then_some(Value::Array(kept))
            }
            Value::Object(members) if !members.is_empty() => {
                let mut kept = Map::new();

                for (name, member) in members {
                    // An empty name adds no segment at any depth
                    let parent_len = key_path.len();
                    if !name.is_empty() {
                        if parent_len > 0 {
                            key_path.push(KEY_SEPARATOR);
                        }
                        key_path.push_str(&name);
                    }

                    let retained = self.retain_at(member, key_path);
                    key_path.truncate(parent_len);

                    if let Some(member) = retained {
                        kept.insert(name, member);
                    }
                }

                (!kept.is_empty()).then_some(Value::Object(kept))
            }
            leaf => {
                if self.rules.permits_key(key_path) {
                    Some(leaf)
                } else {
                    debug!("Dropping response value at '{}'", key_path);
                    None
                }
            }
        }
    }
}
