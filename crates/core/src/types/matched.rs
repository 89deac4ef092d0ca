//! Rules matched for a single request

use super::rules::Rule;

/// The rules whose path pattern and methods matched one request.
///
/// Borrowed from the registry and owned by the request that computed it.
/// Inserting the same rule twice keeps one copy.
#[derive(Debug, Clone, Default)]
pub struct MatchedRuleSet<'a> {
    rules: Vec<&'a Rule>,
}

impl<'a> MatchedRuleSet<'a> {
    /// Create an empty set
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule unless this exact rule is already present
    pub fn insert(&mut self, rule: &'a Rule) {
        if !self.rules.iter().any(|r| std::ptr::eq(*r, rule)) {
            self.rules.push(rule);
        }
    }

    /// Whether any matched rule whitelists the key-path
    #[must_use]
    pub fn permits_key(&self, key_path: &str) -> bool {
        self.rules.iter().any(|rule| rule.permits_key(key_path))
    }

    /// Number of distinct rules
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether no rule matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<'a> FromIterator<&'a Rule> for MatchedRuleSet<'a> {
    fn from_iter<I: IntoIterator<Item = &'a Rule>>(iter: I) -> Self {
        let mut set = Self::new();
        for rule in iter {
            set.insert(rule);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Pattern;

    fn rule(keys: &[&str]) -> Rule {
        Rule::new(
            ["GET"],
            keys.iter().map(|k| Pattern::new(*k).unwrap()).collect(),
        )
    }

    #[test]
    fn test_insert_deduplicates_identical_rules() {
        let a = rule(&["id"]);
        let b = rule(&["id"]);

        let mut set = MatchedRuleSet::new();
        set.insert(&a);
        set.insert(&a);
        set.insert(&b);

        // `a` and `b` are equal in content but distinct registry entries
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_permits_key_is_union_of_rules() {
        let ids = rule(&["id"]);
        let names = rule(&["name/*"]);
        let set: MatchedRuleSet<'_> = [&ids, &names].into_iter().collect();

        assert!(set.permits_key("id"));
        assert!(set.permits_key("name/first"));
        assert!(!set.permits_key("secret"));
        assert!(!MatchedRuleSet::new().permits_key("id"));
    }
}
