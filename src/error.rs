//! Matcher error types.
//!
//! The matcher itself never raises for an ordinary non-match (see the module
//! docs on [`crate::matcher`]): a failed match is just `false`. [`MatcherError`]
//! only models the fatal, non-recoverable invariant violations documented in
//! `MatcherError`'s variant docs below — internal programming errors, not
//! runtime conditions a caller can recover from.

use thiserror::Error;

/// Fatal, non-recoverable matcher errors.
///
/// These never result from an ordinary pattern/expression mismatch. They
/// indicate a bug in how the matcher was invoked or in a collaborator's
/// contract.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatcherError {
    /// `match_retvalue` encountered an attribute value it doesn't know how to
    /// compare.
    #[error("unsupported attribute value kind: {0}")]
    UnsupportedAttrValue(String),

    /// Auto-jump was requested but no `var2val` mapping was supplied.
    #[error("autojump requested without a var2val mapping")]
    MissingVar2Val,

    /// A pattern was memoized with more than one expression in the same
    /// match attempt. This violates the memo invariant in `MatcherState`.
    #[error("pattern already memoized with a different expression")]
    MemoConflict,

    /// The dataflow block rewriter was asked to operate on a variable that
    /// isn't bound in the block it is rewriting.
    #[error("variable not found in dataflow block: {0}")]
    VarNotFound(String),
}

/// Convenience alias used throughout the crate.
pub type MatcherResult<T> = Result<T, MatcherError>;
