//! Deep, value-based equality over expression trees, independent of `Expr`'s
//! pointer identity.

use crate::expr::{AttrMap, Expr, ExprKind};

/// Options controlling a [`structural_equal`] comparison.
///
/// Mirrors the collaborator signature `structural_equal(a, b, map_free_var,
/// assert) -> bool`.
#[derive(Debug, Clone, Copy)]
pub struct StructuralEqOptions {
    /// When true, two distinct free variables are considered equal as long
    /// as they occupy corresponding positions (alpha-equivalence). The
    /// matcher always calls this oracle with `map_free_var = false`, so
    /// variables must match by name.
    pub map_free_var: bool,
    /// When true, a caller-visible assertion fires on mismatch instead of a
    /// quiet `false`. The matcher sets this `true` for attribute comparisons
    /// but, being a pure boolean predicate here, treats it as a no-op beyond
    /// returning `false` — there is no ambient panicking assertion
    /// machinery in this crate to hook into.
    pub assert_on_mismatch: bool,
}

impl Default for StructuralEqOptions {
    fn default() -> Self {
        StructuralEqOptions {
            map_free_var: false,
            assert_on_mismatch: false,
        }
    }
}

/// Deep equality over two expression trees.
pub fn structural_equal(a: &Expr, b: &Expr, opts: StructuralEqOptions) -> bool {
    if a == b {
        return true;
    }
    match (a.kind(), b.kind()) {
        (ExprKind::Constant(x), ExprKind::Constant(y)) => x == y,
        (ExprKind::Var(x), ExprKind::Var(y)) => opts.map_free_var || x == y,
        (ExprKind::DataflowVar(x), ExprKind::DataflowVar(y)) => opts.map_free_var || x == y,
        (ExprKind::GlobalVar(x), ExprKind::GlobalVar(y)) => x == y,
        (ExprKind::ExternFunc(x), ExprKind::ExternFunc(y)) => x == y,
        (ExprKind::Op(x), ExprKind::Op(y)) => x == y,
        (ExprKind::ShapeExpr(x), ExprKind::ShapeExpr(y)) => x == y,
        (ExprKind::Tuple(xs), ExprKind::Tuple(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .zip(ys.iter())
                    .all(|(x, y)| structural_equal(x, y, opts))
        }
        (
            ExprKind::TupleGetItem {
                tuple: xt,
                index: xi,
            },
            ExprKind::TupleGetItem {
                tuple: yt,
                index: yi,
            },
        ) => xi == yi && structural_equal(xt, yt, opts),
        (
            ExprKind::Call {
                op: xo,
                args: xa,
                attrs: xattrs,
            },
            ExprKind::Call {
                op: yo,
                args: ya,
                attrs: yattrs,
            },
        ) => {
            structural_equal(xo, yo, opts)
                && xa.len() == ya.len()
                && xa
                    .iter()
                    .zip(ya.iter())
                    .all(|(x, y)| structural_equal(x, y, opts))
                && attrs_equal(xattrs, yattrs)
        }
        (
            ExprKind::Function {
                params: xp,
                body: xb,
                attrs: xattrs,
            },
            ExprKind::Function {
                params: yp,
                body: yb,
                attrs: yattrs,
            },
        ) => {
            xp.len() == yp.len()
                && xp
                    .iter()
                    .zip(yp.iter())
                    .all(|(x, y)| structural_equal(x, y, opts))
                && structural_equal(xb, yb, opts)
                && attrs_equal(xattrs, yattrs)
        }
        (
            ExprKind::If {
                cond: xc,
                then_branch: xt,
                else_branch: xe,
            },
            ExprKind::If {
                cond: yc,
                then_branch: yt,
                else_branch: ye,
            },
        ) => {
            structural_equal(xc, yc, opts)
                && structural_equal(xt, yt, opts)
                && structural_equal(xe, ye, opts)
        }
        _ => false,
    }
}

fn attrs_equal(a: &AttrMap, b: &AttrMap) -> bool {
    a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distinct_objects_with_same_shape_are_structurally_equal() {
        let a = Expr::call_op("add", vec![Expr::var("x"), Expr::var("y")]);
        let b = Expr::call_op("add", vec![Expr::var("x"), Expr::var("y")]);
        assert!(structural_equal(&a, &b, StructuralEqOptions::default()));
    }

    #[test]
    fn differing_var_names_are_unequal_without_map_free_var() {
        let a = Expr::var("x");
        let b = Expr::var("y");
        assert!(!structural_equal(&a, &b, StructuralEqOptions::default()));
    }

    #[test]
    fn map_free_var_ignores_variable_names() {
        let a = Expr::var("x");
        let b = Expr::var("y");
        let opts = StructuralEqOptions {
            map_free_var: true,
            assert_on_mismatch: false,
        };
        assert!(structural_equal(&a, &b, opts));
    }

    #[test]
    fn different_arity_tuples_are_unequal() {
        let a = Expr::tuple(vec![Expr::var("x")]);
        let b = Expr::tuple(vec![Expr::var("x"), Expr::var("y")]);
        assert!(!structural_equal(&a, &b, StructuralEqOptions::default()));
    }
}
