//! Domain types shared by the token codec, authorization and filtering

mod matched;
mod record;
mod registry;
mod rules;

pub use matched::MatchedRuleSet;
pub use record::CapabilityRecord;
pub use registry::RoleRegistry;
pub use rules::{MethodSet, RoleRules, Rule};
