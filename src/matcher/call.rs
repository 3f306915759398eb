//! Call-pattern matching: positional, commutative (`add`/`multiply`), and
//! associative (`multiply`/`divide`) rewriting.

use crate::error::MatcherResult;
use crate::expr::{Expr, ExprKind};
use crate::pattern::{Pattern, PatternKind};

use super::Matcher;

pub(crate) fn match_call(
    matcher: &mut Matcher,
    op_pattern: &Pattern,
    args_pattern: &Option<Vec<Pattern>>,
    expr: &Expr,
) -> MatcherResult<bool> {
    let (expr_op, expr_args) = match expr.kind() {
        ExprKind::Call { op, args, .. } => (op.clone(), args.clone()),
        _ => return Ok(false),
    };

    let watermark = matcher.matched_nodes.len();

    if matcher.visit(op_pattern, &expr_op)? {
        match args_pattern {
            None => return Ok(true),
            Some(pattern_args) if pattern_args.len() == expr_args.len() => {
                if match_args_positional(matcher, pattern_args, &expr_args)? {
                    return Ok(true);
                }
                matcher.rollback(watermark);

                if pattern_args.len() == 2 && is_commutative(&expr_op) {
                    let swapped = [expr_args[1].clone(), expr_args[0].clone()];
                    if match_args_positional(matcher, pattern_args, &swapped)? {
                        return Ok(true);
                    }
                    matcher.rollback(watermark);
                }
            }
            Some(_) => {}
        }
    }
    matcher.rollback(watermark);

    if let Some(pattern_args) = args_pattern {
        if let Some((pa, pb, pc)) = decompose_mul_div_pattern(op_pattern, pattern_args) {
            if let Some((ea, eb, ec)) = decompose_mul_div_expr(expr) {
                // `a * b` is commutative, so the canonical `(a, b, c)` triple
                // from the pattern may align with the expression's triple in
                // either order for its first two slots.
                if matcher.visit(pa, &ea)? && matcher.visit(pb, &eb)? && matcher.visit(pc, &ec)? {
                    return Ok(true);
                }
                matcher.rollback(watermark);

                if matcher.visit(pa, &eb)? && matcher.visit(pb, &ea)? && matcher.visit(pc, &ec)? {
                    return Ok(true);
                }
                matcher.rollback(watermark);
            }
        }
    }

    Ok(false)
}

fn match_args_positional(matcher: &mut Matcher, patterns: &[Pattern], exprs: &[Expr]) -> MatcherResult<bool> {
    for (p, e) in patterns.iter().zip(exprs.iter()) {
        if !matcher.visit(p, e)? {
            return Ok(false);
        }
    }
    Ok(true)
}

fn is_commutative(op: &Expr) -> bool {
    matches!(op.kind(), ExprKind::Op(name) if name == "add" || name == "multiply")
}

fn pattern_op_name(op: &Pattern) -> Option<&str> {
    match op.kind() {
        PatternKind::ExprLiteral(e) => match e.kind() {
            ExprKind::Op(name) => Some(name.as_str()),
            _ => None,
        },
        _ => None,
    }
}

/// If `op(args)` is literally written as `divide(multiply(a, b), c)` or
/// `multiply(a, divide(b, c))`, return the three operand patterns in the
/// canonical `(a, b, c)` order for `a * b / c`.
fn decompose_mul_div_pattern<'a>(
    op: &Pattern,
    args: &'a [Pattern],
) -> Option<(&'a Pattern, &'a Pattern, &'a Pattern)> {
    if args.len() != 2 {
        return None;
    }
    match pattern_op_name(op)? {
        "divide" => {
            if let PatternKind::Call {
                op: inner_op,
                args: Some(inner_args),
            } = args[0].kind()
            {
                if pattern_op_name(inner_op) == Some("multiply") && inner_args.len() == 2 {
                    return Some((&inner_args[0], &inner_args[1], &args[1]));
                }
            }
            None
        }
        "multiply" => {
            if let PatternKind::Call {
                op: inner_op,
                args: Some(inner_args),
            } = args[1].kind()
            {
                if pattern_op_name(inner_op) == Some("divide") && inner_args.len() == 2 {
                    return Some((&args[0], &inner_args[0], &inner_args[1]));
                }
            }
            None
        }
        _ => None,
    }
}

fn decompose_mul_div_expr(expr: &Expr) -> Option<(Expr, Expr, Expr)> {
    let (op, args) = match expr.kind() {
        ExprKind::Call { op, args, .. } => (op, args),
        _ => return None,
    };
    if args.len() != 2 {
        return None;
    }
    match op.kind() {
        ExprKind::Op(name) if name == "divide" => {
            if let ExprKind::Call {
                op: inner_op,
                args: inner_args,
                ..
            } = args[0].kind()
            {
                if matches!(inner_op.kind(), ExprKind::Op(n) if n == "multiply") && inner_args.len() == 2 {
                    return Some((inner_args[0].clone(), inner_args[1].clone(), args[1].clone()));
                }
            }
            None
        }
        ExprKind::Op(name) if name == "multiply" => {
            if let ExprKind::Call {
                op: inner_op,
                args: inner_args,
                ..
            } = args[1].kind()
            {
                if matches!(inner_op.kind(), ExprKind::Op(n) if n == "divide") && inner_args.len() == 2 {
                    return Some((args[0].clone(), inner_args[0].clone(), inner_args[1].clone()));
                }
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::Matcher;

    #[test]
    fn commutative_add_matches_either_order() {
        let x = Expr::var("x");
        let y = Expr::var("y");
        let expr = Expr::call_op("add", vec![x.clone(), y.clone()]);
        let px = Pattern::var("x");
        let py = Pattern::var("y");
        let pattern = Pattern::call_op("add", vec![py, px]);
        assert!(Matcher::match_pattern(&pattern, &expr));
    }

    #[test]
    fn associative_rewrite_unifies_alternate_groupings() {
        let a = Expr::var("a");
        let b = Expr::var("b");
        let c = Expr::var("c");
        // Expression is grouped as a * (b / c)...
        let expr = Expr::call_op("multiply", vec![a.clone(), Expr::call_op("divide", vec![b.clone(), c.clone()])]);
        // ...but the pattern is written as (a * b) / c.
        let pattern = Pattern::call_op(
            "divide",
            vec![
                Pattern::call_op("multiply", vec![Pattern::var("a"), Pattern::var("b")]),
                Pattern::var("c"),
            ],
        );
        assert!(Matcher::match_pattern(&pattern, &expr));
    }
}
