//! Dominator-pattern matching: `Dominator(child, path, parent)`
//! matches `expr` when `child` matches `expr` itself, and every branch
//! reachable from `expr` (excluding the call op) is either `parent` directly
//! or passes through `path` before recursing, and some node in `expr`'s
//! dominator-tree subtree then matches `parent`.
//!
//! The `expr_graph` is built treating variables as transparent — their
//! bound value (`var2val`) is their graph input — which is what lets this
//! algorithm see through a variable binding to the call it names.

use std::collections::HashSet;

use crate::error::MatcherResult;
use crate::expr::Expr;
use crate::pattern::Pattern;

use super::Matcher;

pub(crate) fn match_dominator(
    matcher: &mut Matcher,
    child: &Pattern,
    path: &Pattern,
    parent: &Pattern,
    expr: &Expr,
) -> MatcherResult<bool> {
    if !matcher.visit(child, expr)? {
        return Ok(false);
    }
    Ok(matches_path(matcher, parent, path, expr)? && dominates_parent(matcher, parent, expr)?)
}

/// Every non-op input of `expr` either matches `parent` directly, or
/// matches `path` and recursively satisfies the same property. Exploration
/// does not commit to the memo table except for the `parent` attempts
/// themselves, immediately before each is tried.
///
/// `memoize` is restored to its caller-observed value on every exit path,
/// including when the inner exploration returns `Err` early.
fn matches_path(matcher: &mut Matcher, parent: &Pattern, path: &Pattern, expr: &Expr) -> MatcherResult<bool> {
    let saved_memoize = matcher.memoize;
    let result = matches_path_inner(matcher, parent, path, expr);
    matcher.memoize = saved_memoize;
    result
}

fn matches_path_inner(matcher: &mut Matcher, parent: &Pattern, path: &Pattern, expr: &Expr) -> MatcherResult<bool> {
    let inputs = matcher.expr_graph.non_op_inputs(expr);

    for input in &inputs {
        let watermark = matcher.matched_nodes.len();

        matcher.memoize = true;
        if matcher.visit(parent, input)? {
            continue;
        }
        matcher.rollback(watermark);

        matcher.memoize = false;
        if matcher.visit(path, input)? && matches_path(matcher, parent, path, input)? {
            continue;
        }
        matcher.rollback(watermark);
        return Ok(false);
    }

    Ok(true)
}

/// Depth-first search over `expr`'s dominator-tree subtree, succeeding as
/// soon as some descendant matches `parent`.
fn dominates_parent(matcher: &mut Matcher, parent: &Pattern, expr: &Expr) -> MatcherResult<bool> {
    let mut stack: Vec<Expr> = matcher.expr_graph.dominator_children(expr).to_vec();
    let mut visited: HashSet<Expr> = HashSet::new();

    while let Some(node) = stack.pop() {
        if !visited.insert(node.clone()) {
            continue;
        }
        let watermark = matcher.matched_nodes.len();
        matcher.memoize = true;
        if matcher.visit(parent, &node)? {
            return Ok(true);
        }
        matcher.rollback(watermark);
        stack.extend(matcher.expr_graph.dominator_children(&node).iter().cloned());
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Matcher;
    use std::collections::HashMap;

    #[test]
    fn var_bound_to_relu_dominates_via_autojump_graph() {
        let relu = Expr::call_op("relu", vec![Expr::var("y")]);
        let x = Expr::var("x");
        let mut var2val = HashMap::new();
        var2val.insert(x.clone(), relu.clone());
        let root = Expr::call_op("sigmoid", vec![x.clone()]);

        let pattern = Pattern::dominator(
            Pattern::var("x"),
            Pattern::wildcard(),
            Pattern::call_op("relu", vec![Pattern::wildcard()]),
        );

        assert!(Matcher::match_expr_pattern(&pattern, &x, var2val));
        let _ = root; // root anchors the graph the matcher is built from in real usage
    }
}
