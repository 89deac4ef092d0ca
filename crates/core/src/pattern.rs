//! Single-segment glob matching shared by path authorization and response
//! key filtering.
//!
//! Patterns follow shell globbing over `/`-separated strings:
//!
//! - `*` matches any run of characters other than `/`, including the empty run
//! - `?` matches exactly one character other than `/`
//! - `[abc]`, `[a-z]`, `[!a-z]` match one character from (or outside) a class
//! - `\` escapes the following metacharacter
//!
//! Every other character, `/` included, matches itself, and a pattern has to
//! cover the whole candidate. `/candidates/*` therefore matches
//! `/candidates/baz` but neither `/candidates` nor `/candidates/baz/boz`.
//!
//! There is no recursive wildcard and no alternation: a run of stars such as
//! `**` is the same as a single `*`, and `{`, `}` and `,` are literal
//! characters.

use crate::errors::{Error, Result};
use globset::{GlobBuilder, GlobMatcher};
use serde::Deserialize;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A compiled glob pattern
#[derive(Clone, Deserialize)]
#[serde(try_from = "String")]
pub struct Pattern {
    source: String,
    matcher: GlobMatcher,
}

impl Pattern {
    /// Compile a pattern, failing with a configuration error when it is malformed
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let glob = GlobBuilder::new(&single_segment(&source))
            .literal_separator(true)
            .backslash_escape(true)
            .build()
            .map_err(|e| Error::configuration(format!("invalid pattern '{source}': {e}")))?;

        Ok(Self {
            matcher: glob.compile_matcher(),
            source,
        })
    }

    /// Test a `/`-separated candidate against the pattern
    #[must_use]
    pub fn matches(&self, candidate: &str) -> bool {
        self.matcher.is_match(candidate)
    }

    /// The pattern as written
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

/// Rewrite a pattern so `globset` reads it with single-segment semantics:
/// star runs collapse to one `*` and braces are escaped. Character classes
/// and escapes are copied through untouched.
fn single_segment(source: &str) -> String {
    let mut out = String::with_capacity(source.len());
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                out.push(c);
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            }
            '[' => {
                out.push(c);
                if let Some(negation) = chars.next_if(|n| *n == '!' || *n == '^') {
                    out.push(negation);
                }
                // A leading `]` is part of the class
                if let Some(bracket) = chars.next_if_eq(&']') {
                    out.push(bracket);
                }
                while let Some(member) = chars.next() {
                    out.push(member);
                    if member == '\\' {
                        if let Some(escaped) = chars.next() {
                            out.push(escaped);
                        }
                    } else if member == ']' {
                        break;
                    }
                }
            }
            '*' => {
                out.push(c);
                while chars.next_if_eq(&'*').is_some() {}
            }
            '{' | '}' => {
                out.push('\\');
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    out
}

impl TryFrom<String> for Pattern {
    type Error = Error;

    fn try_from(source: String) -> Result<Self> {
        Self::new(source)
    }
}

impl TryFrom<&str> for Pattern {
    type Error = Error;

    fn try_from(source: &str) -> Result<Self> {
        Self::new(source)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source
    }
}

impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.source.hash(state);
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.source).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
