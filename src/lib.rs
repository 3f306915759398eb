//! # dataflow_pattern
//!
//! A recursive structural pattern matcher for a dataflow-graph IR
//! ("Relax"-style): decides whether a user-constructed pattern tree matches
//! an IR expression tree.
//!
//! ## Architecture
//!
//! ```text
//! Pattern tree ──┐
//!                ├──> Matcher::visit (dispatch + memo + rollback) ──> bool
//! Expr tree   ───┘        │
//!                         ├─ crate::matcher::call      (commutative/associative Call matching)
//!                         ├─ crate::matcher::attr       (Attr pattern, match_retvalue)
//!                         ├─ crate::matcher::dominator   (Dominator pattern, path + dominator-tree walk)
//!                         └─ crate::expr_graph           (inputs + dominator-tree children, built once per root)
//! ```
//!
//! Supporting the matcher: [`types::infer_type`] (the type/shape oracle),
//! [`analyzer::Analyzer`] (symbolic shape-dimension equality), and
//! [`structural_eq::structural_equal`] (the deep-equality oracle `ExprLiteral`
//! and `match_retvalue` defer to).
//!
//! ## Usage
//!
//! ```
//! use dataflow_pattern::{match_pattern, Expr, Pattern};
//!
//! // Call(Op("add"), [Wildcard, Wildcard])
//! let pattern = Pattern::call_op("add", vec![Pattern::wildcard(), Pattern::wildcard()]);
//! let expr = Expr::call_op("add", vec![Expr::var("a"), Expr::var("b")]);
//! assert!(match_pattern(&pattern, &expr));
//! ```
//!
//! Auto-jumping through a dataflow block's bindings uses
//! [`match_expr_pattern`]:
//!
//! ```
//! use std::collections::HashMap;
//! use dataflow_pattern::{match_expr_pattern, Expr, Pattern};
//!
//! let v = Expr::var("v");
//! let bound = Expr::call_op("add", vec![Expr::var("a"), Expr::var("b")]);
//! let mut var2val = HashMap::new();
//! var2val.insert(v.clone(), bound);
//!
//! let pattern = Pattern::call_op("add", vec![Pattern::wildcard(), Pattern::wildcard()]);
//! assert!(match_expr_pattern(&pattern, &v, var2val));
//! ```
//!
//! ## Non-goals
//!
//! The matcher only recognizes; it does not rewrite, does not capture a
//! full subterm map (read [`matcher::Matcher`]'s memo after a successful
//! match instead), and does not match several patterns simultaneously.
//! IR construction, type inference beyond [`types::infer_type`], and the
//! dataflow-block rewriter's algorithm (only its interface is modeled, in
//! [`rewriter`]) are external collaborators.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod expr;
pub mod expr_graph;
pub mod matcher;
pub mod pattern;
pub mod registry;
pub mod rewriter;
pub mod structural_eq;
pub mod types;

use std::collections::HashMap;

pub use crate::analyzer::{Analyzer, PrimExpr};
pub use crate::config::MatcherConfig;
pub use crate::error::{MatcherError, MatcherResult};
pub use crate::expr::{AttrMap, AttrValue, ConstantValue, Expr, ExprKind};
pub use crate::matcher::Matcher;
pub use crate::pattern::{Pattern, PatternKind};
pub use crate::registry::{DefaultRegistry, Registry, MATCH_EXPR_PATTERN_NAME, MATCH_PATTERN_NAME};
pub use crate::rewriter::{Binding, DataflowBlock, Function, IRModule, StatementRewriter};
pub use crate::structural_eq::{structural_equal, StructuralEqOptions};
pub use crate::types::{infer_type, DType, ShapeKind, Type};

/// Entry point `relax.dataflow_pattern.match`: match `pattern`
/// against `expr` with no variable substitution.
#[tracing::instrument(level = "debug", skip_all)]
pub fn match_pattern(pattern: &Pattern, expr: &Expr) -> bool {
    Matcher::match_pattern(pattern, expr)
}

/// Entry point `relax.dataflow_pattern.match_expr`: match
/// `pattern` against `expr`, auto-jumping through `var2val` at every
/// recursion step except where a pattern variant opts out (`Var`,
/// `DataflowVar`, `Shape`, `DataType`).
#[tracing::instrument(level = "debug", skip_all)]
pub fn match_expr_pattern(pattern: &Pattern, expr: &Expr, var2val: HashMap<Expr, Expr>) -> bool {
    Matcher::match_expr_pattern(pattern, expr, var2val)
}

/// As [`match_pattern`], surfacing a fatal, non-recoverable matcher
/// invariant violation (§7: a memo conflict or an unsupported
/// attribute-value comparison) as `Err` instead of panicking.
#[tracing::instrument(level = "debug", skip_all)]
pub fn try_match_pattern(pattern: &Pattern, expr: &Expr) -> MatcherResult<bool> {
    Matcher::try_match_pattern(pattern, expr)
}

/// As [`match_expr_pattern`], surfacing a fatal, non-recoverable matcher
/// invariant violation as `Err` instead of panicking.
#[tracing::instrument(level = "debug", skip_all)]
pub fn try_match_expr_pattern(
    pattern: &Pattern,
    expr: &Expr,
    var2val: HashMap<Expr, Expr>,
) -> MatcherResult<bool> {
    Matcher::try_match_expr_pattern(pattern, expr, var2val)
}
