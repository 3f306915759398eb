//! The matcher core: dispatch, memoization, and rollback.
//!
//! A `Matcher` owns the mutable state of a single top-level match attempt:
//! the memo table, the rollback stack (`matched_nodes`), and the expression
//! graph built once at construction time. `visit` is the single recursive
//! entry point every pattern variant funnels through — it is responsible for
//! the auto-jump substitution, memo short-circuit, and commit/rollback
//! bookkeeping, so that each pattern-variant handler (in this module or in
//! [`call`], [`dominator`], [`attr`]) only needs to implement its own local
//! matching rule and recurse via `visit` for sub-patterns.
//!
//! A failed match is never an error — it's `false`. [`crate::error::MatcherError`]
//! is reserved for contract violations a caller can't recover from by trying
//! a different pattern: a `match_retvalue` comparison over an unsupported
//! attribute-value kind, or a pattern memoized with two different
//! expressions in the same attempt. Both abort the whole match attempt by
//! propagating `Err` out through `visit`/`dispatch` rather than degrading to
//! an ordinary non-match.

pub mod attr;
pub mod call;
pub mod dominator;

use std::collections::HashMap;

use crate::analyzer::Analyzer;
use crate::config::MatcherConfig;
use crate::error::{MatcherError, MatcherResult};
use crate::expr::{Expr, ExprKind};
use crate::expr_graph::ExprGraph;
use crate::pattern::{Pattern, PatternKind};
use crate::types::{infer_type, ShapeKind, Type};

pub use self::attr::match_retvalue;

/// State and dispatcher for one top-level [`Matcher::match_pattern`] or
/// [`Matcher::match_expr_pattern`] call.
pub struct Matcher {
    memo: HashMap<Pattern, Expr>,
    matched_nodes: Vec<Pattern>,
    memoize: bool,
    autojump: bool,
    var2val: HashMap<Expr, Expr>,
    expr_graph: ExprGraph,
    analyzer: Analyzer,
    config: MatcherConfig,
    depth: usize,
}

impl Matcher {
    fn new(root: &Expr, var2val: HashMap<Expr, Expr>, autojump: bool, config: MatcherConfig) -> Self {
        let expr_graph = ExprGraph::build(root, &var2val);
        Matcher {
            memo: HashMap::new(),
            matched_nodes: Vec::new(),
            memoize: true,
            autojump,
            var2val,
            expr_graph,
            analyzer: Analyzer::new(),
            config,
            depth: 0,
        }
    }

    /// Match `pattern` against `expr` with no variable substitution.
    ///
    /// Panics if the matcher hits a fatal, non-recoverable contract
    /// violation (`MatcherError`, §7) — use [`Matcher::try_match_pattern`]
    /// to observe that condition instead of aborting.
    pub fn match_pattern(pattern: &Pattern, expr: &Expr) -> bool {
        Self::try_match_pattern(pattern, expr).expect("matcher invariant violated")
    }

    /// As [`Matcher::match_pattern`], surfacing a fatal contract violation
    /// as `Err` instead of panicking.
    pub fn try_match_pattern(pattern: &Pattern, expr: &Expr) -> MatcherResult<bool> {
        Self::try_match_pattern_with_config(pattern, expr, MatcherConfig::default())
    }

    /// As [`Matcher::match_pattern`], with an explicit recursion/memo guard.
    pub fn match_pattern_with_config(pattern: &Pattern, expr: &Expr, config: MatcherConfig) -> bool {
        Self::try_match_pattern_with_config(pattern, expr, config).expect("matcher invariant violated")
    }

    /// As [`Matcher::match_pattern_with_config`], surfacing a fatal contract
    /// violation as `Err` instead of panicking.
    pub fn try_match_pattern_with_config(
        pattern: &Pattern,
        expr: &Expr,
        config: MatcherConfig,
    ) -> MatcherResult<bool> {
        let mut matcher = Matcher::new(expr, HashMap::new(), false, config);
        let result = matcher.visit(pattern, expr);
        tracing::trace!(matched = ?result, "match_pattern");
        result
    }

    /// Match `pattern` against `expr`, auto-jumping through `var2val` at
    /// every recursion step except where the pattern itself asks to see the
    /// variable (`Var`, `DataflowVar`, `Shape`, and `DataType` patterns never
    /// auto-jump).
    ///
    /// Panics if the matcher hits a fatal, non-recoverable contract
    /// violation (`MatcherError`, §7) — use
    /// [`Matcher::try_match_expr_pattern`] to observe that condition instead
    /// of aborting.
    pub fn match_expr_pattern(pattern: &Pattern, expr: &Expr, var2val: HashMap<Expr, Expr>) -> bool {
        Self::try_match_expr_pattern(pattern, expr, var2val).expect("matcher invariant violated")
    }

    /// As [`Matcher::match_expr_pattern`], surfacing a fatal contract
    /// violation as `Err` instead of panicking.
    pub fn try_match_expr_pattern(
        pattern: &Pattern,
        expr: &Expr,
        var2val: HashMap<Expr, Expr>,
    ) -> MatcherResult<bool> {
        Self::try_match_expr_pattern_with_config(pattern, expr, var2val, MatcherConfig::default())
    }

    /// As [`Matcher::match_expr_pattern`], with an explicit recursion/memo
    /// guard.
    pub fn match_expr_pattern_with_config(
        pattern: &Pattern,
        expr: &Expr,
        var2val: HashMap<Expr, Expr>,
        config: MatcherConfig,
    ) -> bool {
        Self::try_match_expr_pattern_with_config(pattern, expr, var2val, config)
            .expect("matcher invariant violated")
    }

    /// As [`Matcher::match_expr_pattern_with_config`], surfacing a fatal
    /// contract violation as `Err` instead of panicking.
    pub fn try_match_expr_pattern_with_config(
        pattern: &Pattern,
        expr: &Expr,
        var2val: HashMap<Expr, Expr>,
        config: MatcherConfig,
    ) -> MatcherResult<bool> {
        let mut matcher = Matcher::new(expr, var2val, true, config);
        let result = matcher.visit(pattern, expr);
        tracing::trace!(matched = ?result, autojump = true, "match_expr_pattern");
        result
    }

    pub(crate) fn rollback(&mut self, watermark: usize) {
        while self.matched_nodes.len() > watermark {
            if let Some(p) = self.matched_nodes.pop() {
                self.memo.remove(&p);
            }
        }
    }

    /// Dispatch `pattern` against `expr`, handling auto-jump substitution,
    /// the memo shortcut, and commit/rollback around the variant-level
    /// match in [`dispatch`].
    ///
    /// Per spec.md §4.1, auto-jump substitution (step 1) happens strictly
    /// before the memo lookup (step 2): the memo is keyed and compared
    /// against the substituted `candidate`, not the raw incoming `expr`, so
    /// a pattern visited twice through two different auto-jumping variables
    /// bound to the same value is recognized as a consistent back-reference.
    pub(crate) fn visit(&mut self, pattern: &Pattern, expr: &Expr) -> MatcherResult<bool> {
        let candidate = self.autojump_target(pattern, expr);

        if self.memoize {
            if let Some(bound) = self.memo.get(pattern) {
                return Ok(bound == &candidate);
            }
        }

        if self.depth >= self.config.max_recursion_depth || self.memo.len() >= self.config.max_memo_entries {
            tracing::debug!(
                depth = self.depth,
                memo_entries = self.memo.len(),
                "matcher resource guard hit, treating as non-match"
            );
            return Ok(false);
        }

        let watermark = self.matched_nodes.len();
        self.depth += 1;
        let matched = self.dispatch(pattern, &candidate);
        self.depth -= 1;
        let matched = matched?;

        if !matched {
            self.rollback(watermark);
            return Ok(false);
        }

        if let Some(existing) = self.memo.get(pattern) {
            if existing != &candidate {
                // A pattern was about to be bound to a second, different
                // expression in the same attempt (§3's back-reference
                // invariant). This only happens when `memoize` was false
                // during the dispatch above (dominator path exploration),
                // since the short-circuit at the top of this function
                // already enforces it whenever `memoize` is true — so it is
                // a genuine invariant violation, not an ordinary mismatch.
                self.rollback(watermark);
                return Err(MatcherError::MemoConflict);
            }
        } else {
            self.memo.insert(pattern.clone(), candidate.clone());
        }
        self.matched_nodes.push(pattern.clone());
        Ok(true)
    }

    fn autojump_target(&self, pattern: &Pattern, expr: &Expr) -> Expr {
        if !self.autojump {
            return expr.clone();
        }
        let exempt = matches!(
            pattern.kind(),
            PatternKind::Var(_)
                | PatternKind::DataflowVar(_)
                | PatternKind::Shape { .. }
                | PatternKind::DataType { .. }
        );
        if exempt {
            return expr.clone();
        }
        match expr.kind() {
            ExprKind::Var(_) | ExprKind::DataflowVar(_) => {
                self.var2val.get(expr).cloned().unwrap_or_else(|| expr.clone())
            }
            _ => expr.clone(),
        }
    }

    /// Match `patterns` against `exprs` pairwise, in order. `Ok(false)` on
    /// arity mismatch or the first pairwise failure; `Err` propagates a
    /// fatal contract violation out immediately.
    fn visit_all(&mut self, patterns: &[Pattern], exprs: &[Expr]) -> MatcherResult<bool> {
        if patterns.len() != exprs.len() {
            return Ok(false);
        }
        for (p, e) in patterns.iter().zip(exprs.iter()) {
            if !self.visit(p, e)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn dispatch(&mut self, pattern: &Pattern, expr: &Expr) -> MatcherResult<bool> {
        match pattern.kind() {
            PatternKind::Wildcard => Ok(true),
            PatternKind::Constant => Ok(matches!(expr.kind(), ExprKind::Constant(_))),
            PatternKind::Var(hint) => Ok(match expr.kind() {
                ExprKind::Var(name) => hint.is_empty() || hint == name,
                _ => false,
            }),
            PatternKind::DataflowVar(hint) => Ok(match expr.kind() {
                ExprKind::DataflowVar(name) => hint.is_empty() || hint == name,
                _ => false,
            }),
            PatternKind::GlobalVar(hint) => Ok(match expr.kind() {
                ExprKind::GlobalVar(name) => hint.is_empty() || hint == name,
                _ => false,
            }),
            PatternKind::ExternFunc(hint) => Ok(match expr.kind() {
                ExprKind::ExternFunc(name) => hint.is_empty() || hint == name,
                _ => false,
            }),
            PatternKind::ExprLiteral(literal) => Ok(crate::structural_eq::structural_equal(
                literal,
                expr,
                crate::structural_eq::StructuralEqOptions::default(),
            )),
            PatternKind::RuntimeDepShape => Ok(matches!(expr.shape(), Some(ShapeKind::RuntimeDep))),
            PatternKind::Tuple(fields) => match (fields, expr.kind()) {
                (None, ExprKind::Tuple(_)) => Ok(true),
                (Some(patterns), ExprKind::Tuple(exprs)) => self.visit_all(patterns, exprs),
                _ => Ok(false),
            },
            PatternKind::TupleGetItem { tuple, index } => match expr.kind() {
                ExprKind::TupleGetItem {
                    tuple: et,
                    index: ei,
                } => {
                    if *index != -1 && *index != *ei {
                        return Ok(false);
                    }
                    self.visit(tuple, et)
                }
                _ => Ok(false),
            },
            PatternKind::Call { op, args } => call::match_call(self, op, args, expr),
            PatternKind::Function { params, body } => match expr.kind() {
                ExprKind::Function {
                    params: eparams,
                    body: ebody,
                    ..
                } => {
                    let params_ok = match params {
                        None => true,
                        Some(p) => self.visit_all(p, eparams)?,
                    };
                    if !params_ok {
                        return Ok(false);
                    }
                    self.visit(body, ebody)
                }
                _ => Ok(false),
            },
            PatternKind::If {
                cond,
                then_branch,
                else_branch,
            } => match expr.kind() {
                ExprKind::If {
                    cond: ec,
                    then_branch: et,
                    else_branch: ee,
                } => Ok(self.visit(cond, ec)? && self.visit(then_branch, et)? && self.visit(else_branch, ee)?),
                _ => Ok(false),
            },
            PatternKind::Attr { inner, attrs } => attr::match_attr(self, inner, attrs, expr),
            PatternKind::Type { inner, ty } => Ok(self.visit(inner, expr)? && infer_type(expr) == *ty),
            PatternKind::Shape { inner, dims } => {
                if !self.visit(inner, expr)? {
                    return Ok(false);
                }
                Ok(match expr.shape() {
                    Some(ShapeKind::Known(edims)) => {
                        dims.len() == edims.len()
                            && dims.iter().zip(edims.iter()).all(|(d, e)| self.analyzer.equal(d, e))
                    }
                    _ => false,
                })
            }
            PatternKind::DataType { inner, dtype } => {
                if !self.visit(inner, expr)? {
                    return Ok(false);
                }
                Ok(match infer_type(expr) {
                    Type::Tensor { dtype: edtype, .. } => edtype == *dtype,
                    _ => false,
                })
            }
            PatternKind::PrimArr(values) => Ok(match expr.kind() {
                ExprKind::ShapeExpr(edims) => {
                    values.len() == edims.len()
                        && values.iter().zip(edims.iter()).all(|(v, e)| self.analyzer.equal(v, e))
                }
                _ => false,
            }),
            PatternKind::Or(left, right) => {
                if self.visit(left, expr)? {
                    return Ok(true);
                }
                self.visit(right, expr)
            }
            PatternKind::And(left, right) => Ok(self.visit(left, expr)? && self.visit(right, expr)?),
            PatternKind::Not(reject) => {
                let watermark = self.matched_nodes.len();
                let matched = self.visit(reject, expr)?;
                self.rollback(watermark);
                Ok(!matched)
            }
            PatternKind::Dominator {
                child,
                path,
                parent,
            } => dominator::match_dominator(self, child, path, parent, expr),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    #[test]
    fn wildcard_matches_anything() {
        assert!(Matcher::match_pattern(&Pattern::wildcard(), &Expr::var("x")));
    }

    #[test]
    fn var_pattern_respects_name_hint() {
        let expr = Expr::var("x");
        assert!(Matcher::match_pattern(&Pattern::var("x"), &expr));
        assert!(!Matcher::match_pattern(&Pattern::var("y"), &expr));
        assert!(Matcher::match_pattern(&Pattern::var(""), &expr));
    }

    #[test]
    fn shape_pattern_is_order_sensitive() {
        use crate::analyzer::PrimExpr;
        use crate::types::ShapeKind;

        let expr = Expr::var("x").with_shape(ShapeKind::Known(vec![PrimExpr::int(1), PrimExpr::int(2)]));
        let ok = Pattern::has_shape(Pattern::wildcard(), vec![PrimExpr::int(1), PrimExpr::int(2)]);
        let swapped = Pattern::has_shape(Pattern::wildcard(), vec![PrimExpr::int(2), PrimExpr::int(1)]);
        assert!(Matcher::match_pattern(&ok, &expr));
        assert!(!Matcher::match_pattern(&swapped, &expr));
    }

    #[test]
    fn not_constant_rejects_constants_and_accepts_everything_else() {
        let pattern = Pattern::not(Pattern::constant());
        assert!(!Matcher::match_pattern(&pattern, &Expr::constant("1")));
        assert!(Matcher::match_pattern(&pattern, &Expr::var("x")));
    }

    #[test]
    fn and_requires_both_sides_and_rolls_back_on_failure() {
        let pattern = Pattern::and(Pattern::var("x"), Pattern::constant());
        assert!(!Matcher::match_pattern(&pattern, &Expr::var("x")));
    }

    #[test]
    fn autojump_true_resolves_variable_to_bound_value() {
        let x = Expr::var("x");
        let bound = Expr::constant("42");
        let mut var2val = HashMap::new();
        var2val.insert(x.clone(), bound);
        let pattern = Pattern::constant();
        assert!(Matcher::match_expr_pattern(&pattern, &x, var2val));
    }

    #[test]
    fn autojump_false_leaves_variable_unresolved() {
        let x = Expr::var("x");
        let pattern = Pattern::constant();
        assert!(!Matcher::match_pattern(&pattern, &x));
    }

    #[test]
    fn autojump_compares_memo_against_substituted_value_not_raw_variable() {
        // `p` is reused against two *different* variables that both jump to
        // the *same* bound value — per spec.md §4.1 step 1 (auto-jump)
        // strictly precedes step 2 (the memo check), the second visit must
        // compare the memo's stored expression against the substituted
        // value, not the raw `var2` handle, so this back-reference holds.
        let shared_value = Expr::constant("42");
        let var1 = Expr::var("v1");
        let var2 = Expr::var("v2");
        let mut var2val = HashMap::new();
        var2val.insert(var1.clone(), shared_value.clone());
        var2val.insert(var2.clone(), shared_value);

        let p = Pattern::constant();
        let mut matcher = Matcher::new(&var1, var2val, true, MatcherConfig::default());
        assert!(matcher.visit(&p, &var1).unwrap());
        assert!(matcher.visit(&p, &var2).unwrap());
    }

    #[test]
    fn rebinding_a_memoized_pattern_to_a_different_expression_is_a_fatal_error() {
        // With `memoize` forced off (as during dominator path exploration),
        // the early memo short-circuit in `visit` is bypassed, so a second,
        // conflicting bind must surface as `MatcherError::MemoConflict`
        // rather than degrade to a silent non-match (spec.md §7).
        let mut matcher = Matcher::new(&Expr::var("root"), HashMap::new(), false, MatcherConfig::default());
        matcher.memoize = false;

        let p = Pattern::wildcard();
        let a = Expr::var("a");
        let b = Expr::var("b");
        assert!(matcher.visit(&p, &a).unwrap());
        assert_eq!(matcher.visit(&p, &b), Err(MatcherError::MemoConflict));
    }

    #[test]
    fn try_match_pattern_returns_ok_false_for_an_ordinary_mismatch() {
        // Contrasts with the fatal-error tests above: an ordinary failed
        // match is still `Ok(false)`, never `Err`.
        let pattern = Pattern::constant();
        let result = Matcher::try_match_pattern(&pattern, &Expr::var("x"));
        assert_eq!(result, Ok(false));
    }
}
