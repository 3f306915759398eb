//! Symbolic integer arithmetic for shape dimensions.
//!
//! Shape patterns need an "arithmetic analyzer" capable of deciding whether
//! two symbolic shape dimensions are equal (`analyzer.simplify`) without
//! pinning down the expression type it operates over. [`PrimExpr`] and
//! [`Analyzer`] supply that piece: a small closed enum plus a fixpoint
//! `simplify` — constant folding to a canonical form, then structural
//! comparison.

use std::collections::BTreeMap;
use std::fmt;

/// A symbolic integer expression, used for shape dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PrimExpr {
    /// A free symbolic variable, e.g. a batch size `n`.
    Var(String),
    /// An integer literal.
    Const(i64),
    Add(Box<PrimExpr>, Box<PrimExpr>),
    Sub(Box<PrimExpr>, Box<PrimExpr>),
    Mul(Box<PrimExpr>, Box<PrimExpr>),
    Div(Box<PrimExpr>, Box<PrimExpr>),
}

impl fmt::Display for PrimExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimExpr::Var(name) => write!(f, "{name}"),
            PrimExpr::Const(v) => write!(f, "{v}"),
            PrimExpr::Add(a, b) => write!(f, "({a} + {b})"),
            PrimExpr::Sub(a, b) => write!(f, "({a} - {b})"),
            PrimExpr::Mul(a, b) => write!(f, "({a} * {b})"),
            PrimExpr::Div(a, b) => write!(f, "({a} / {b})"),
        }
    }
}

impl PrimExpr {
    pub fn int(v: i64) -> Self {
        PrimExpr::Const(v)
    }

    pub fn var(name: impl Into<String>) -> Self {
        PrimExpr::Var(name.into())
    }
}

/// Arithmetic simplifier used to decide equality of symbolic shape
/// dimensions.
///
/// Bindings let a caller fix free variables to known constants before
/// simplifying (e.g. when a dominating scope already pinned `n`); the
/// matcher itself only ever uses an analyzer with no bindings, relying on
/// purely syntactic simplification of constant-folded arithmetic.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    bindings: BTreeMap<String, i64>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, name: impl Into<String>, value: i64) {
        self.bindings.insert(name.into(), value);
    }

    /// Simplify `expr` to a canonical form: constant-fold everything that
    /// can be folded, leave free variables as-is.
    pub fn simplify(&self, expr: &PrimExpr) -> PrimExpr {
        match expr {
            PrimExpr::Var(name) => match self.bindings.get(name) {
                Some(v) => PrimExpr::Const(*v),
                None => expr.clone(),
            },
            PrimExpr::Const(_) => expr.clone(),
            PrimExpr::Add(a, b) => self.fold(a, b, |x, y| x + y, PrimExpr::Add),
            PrimExpr::Sub(a, b) => self.fold(a, b, |x, y| x - y, PrimExpr::Sub),
            PrimExpr::Mul(a, b) => self.fold(a, b, |x, y| x * y, PrimExpr::Mul),
            PrimExpr::Div(a, b) => {
                let left = self.simplify(a);
                let right = self.simplify(b);
                if let (PrimExpr::Const(x), PrimExpr::Const(y)) = (&left, &right) {
                    if *y != 0 && x % y == 0 {
                        return PrimExpr::Const(x / y);
                    }
                }
                PrimExpr::Div(Box::new(left), Box::new(right))
            }
        }
    }

    fn fold(
        &self,
        a: &PrimExpr,
        b: &PrimExpr,
        op: impl Fn(i64, i64) -> i64,
        rebuild: impl Fn(Box<PrimExpr>, Box<PrimExpr>) -> PrimExpr,
    ) -> PrimExpr {
        let left = self.simplify(a);
        let right = self.simplify(b);
        if let (PrimExpr::Const(x), PrimExpr::Const(y)) = (&left, &right) {
            PrimExpr::Const(op(*x, *y))
        } else {
            rebuild(Box::new(left), Box::new(right))
        }
    }

    /// Decide whether `a == b` simplifies to true under this analyzer.
    pub fn equal(&self, a: &PrimExpr, b: &PrimExpr) -> bool {
        self.simplify(a) == self.simplify(b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn folds_constants() {
        let az = Analyzer::new();
        let e = PrimExpr::Add(Box::new(PrimExpr::int(1)), Box::new(PrimExpr::int(2)));
        assert_eq!(az.simplify(&e), PrimExpr::Const(3));
    }

    #[test]
    fn free_vars_compare_equal_by_name() {
        let az = Analyzer::new();
        assert!(az.equal(&PrimExpr::var("n"), &PrimExpr::var("n")));
        assert!(!az.equal(&PrimExpr::var("n"), &PrimExpr::var("m")));
    }

    #[test]
    fn bound_vars_fold_to_constants() {
        let mut az = Analyzer::new();
        az.bind("n", 4);
        assert!(az.equal(&PrimExpr::var("n"), &PrimExpr::int(4)));
    }

    #[test]
    fn exact_division_folds() {
        let az = Analyzer::new();
        let e = PrimExpr::Div(Box::new(PrimExpr::int(8)), Box::new(PrimExpr::int(2)));
        assert_eq!(az.simplify(&e), PrimExpr::Const(4));
    }

    #[test]
    fn inexact_division_stays_symbolic() {
        let az = Analyzer::new();
        let e = PrimExpr::Div(Box::new(PrimExpr::var("n")), Box::new(PrimExpr::int(2)));
        assert_eq!(az.simplify(&e), e);
    }
}
