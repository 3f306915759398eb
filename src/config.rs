//! Matcher configuration: recursion and memo-size guards.
//!
//! The matcher proper has no process entry point of its own (it's a
//! library, consumed via [`crate::match_pattern`]/[`crate::match_expr_pattern`]),
//! so there's no `config.toml`/env-file layer to load the way a standalone
//! service would need. `MatcherConfig` is instead constructed directly by
//! callers who want to bound a pathological pattern/expression pair;
//! [`Matcher::match_pattern`](crate::matcher::Matcher) itself uses
//! [`MatcherConfig::default`] and never consults the filesystem.

use serde::{Deserialize, Serialize};

/// Guards against runaway recursion or memo growth on adversarial or
/// accidentally-cyclic-looking inputs.
///
/// Neither guard currently changes the *result* of a match — the matcher as
/// specified has no cancellation points — but both give a host
/// embedding this crate a knob to fail fast rather than let a single
/// `match_pattern` call run unbounded over a hostile pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Maximum recursion depth the dispatcher will descend to before giving
    /// up and treating the attempt as a non-match, guarding against a
    /// pathologically deep pattern/expression pair driving the rollback
    /// stack to O(N) depth.
    pub max_recursion_depth: usize,

    /// Soft cap on the number of distinct patterns the memo table may hold
    /// during one match attempt.
    pub max_memo_entries: usize,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        MatcherConfig {
            max_recursion_depth: 4_096,
            max_memo_entries: 65_536,
        }
    }
}
