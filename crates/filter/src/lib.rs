//! Whitelisting of JSON responses by key-path
//!
//! A value's key-path is the `/`-joined list of object member names leading
//! to it. Array elements contribute no segment: in `{"jobs":[{"name":"x"}]}`
//! the string `"x"` sits at `jobs/name`. An empty member name contributes no
//! segment either, wherever it appears, so `{"a":{"":1}}` puts `1` at `a` and
//! a key-path never starts or ends with `/`.
//!
//! Leaves (scalars, `null`, and empty arrays or objects) are kept when any
//! response key pattern of a matched rule matches their key-path. Non-empty
//! containers are rebuilt from their surviving children and vanish when none
//! survive, so a whitelisted leaf keeps its chain of parents and nothing else.

mod filter;

pub use filter::ResponseFilter;
