//! The type/shape lattice used by `Type`, `Shape`, and `DataType` patterns.
//!
//! Type inference is treated as a pure external function
//! (`infer_type(expr) -> type`) and only needs enough of a type system to
//! support structural comparison. [`DType`] and [`Type`] are the minimal
//! lattice `Type`/`Shape`/`DataType` patterns need; `infer_type` here is a
//! real, deterministic implementation rather than a stub, so the crate is
//! self-contained and testable without a separate type-checker dependency.

use crate::analyzer::PrimExpr;
use crate::expr::{Expr, ExprKind};

/// Tensor element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DType {
    Float32,
    Float64,
    Int32,
    Int64,
    Bool,
    /// Anything not covered by the built-in scalar kinds, compared by name.
    Opaque(String),
}

/// A sub-expression's shape, as known to the checker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeKind {
    /// Fully symbolic/static shape: a dimension per axis.
    Known(Vec<PrimExpr>),
    /// Rank and dimensions aren't known until runtime.
    RuntimeDep,
}

/// The checked type of an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Tensor { dtype: DType, shape: ShapeKind },
    Tuple(Vec<Type>),
    Func { params: Vec<Type>, ret: Box<Type> },
    Void,
    /// Anything whose structure the matcher does not need to inspect
    /// (e.g. an opaque attribute's type).
    Object,
}

/// Pure, deterministic type inference.
///
/// Reads the type already attached to `expr` (by whatever upstream checker
/// constructed it) where present; otherwise derives a type structurally so
/// the function is total over every `Expr` the matcher can encounter.
pub fn infer_type(expr: &Expr) -> Type {
    if let Some(t) = expr.checked_type() {
        return t.clone();
    }
    match expr.kind() {
        ExprKind::Constant(_) => Type::Object,
        ExprKind::Var(_) | ExprKind::DataflowVar(_) | ExprKind::GlobalVar(_) => Type::Object,
        ExprKind::ExternFunc(_) | ExprKind::Op(_) => Type::Object,
        ExprKind::Tuple(fields) => Type::Tuple(fields.iter().map(infer_type).collect()),
        ExprKind::TupleGetItem { tuple, index } => match infer_type(tuple) {
            Type::Tuple(fields) if *index >= 0 => fields
                .get(*index as usize)
                .cloned()
                .unwrap_or(Type::Object),
            _ => Type::Object,
        },
        ExprKind::Call { .. } => Type::Object,
        ExprKind::Function { params, body, .. } => Type::Func {
            params: params.iter().map(infer_type).collect(),
            ret: Box::new(infer_type(body)),
        },
        ExprKind::If { then_branch, .. } => infer_type(then_branch),
        ExprKind::ShapeExpr(dims) => Type::Tensor {
            dtype: DType::Int64,
            shape: ShapeKind::Known(vec![PrimExpr::int(dims.len() as i64)]),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::Expr;

    #[test]
    fn constant_infers_object_without_attached_type() {
        let c = Expr::constant("1");
        assert_eq!(infer_type(&c), Type::Object);
    }

    #[test]
    fn attached_type_wins() {
        let c = Expr::constant("1").with_type(Type::Tensor {
            dtype: DType::Int32,
            shape: ShapeKind::Known(vec![]),
        });
        assert_eq!(
            infer_type(&c),
            Type::Tensor {
                dtype: DType::Int32,
                shape: ShapeKind::Known(vec![])
            }
        );
    }

    #[test]
    fn tuple_infers_elementwise() {
        let a = Expr::constant("1").with_type(Type::Tensor {
            dtype: DType::Int32,
            shape: ShapeKind::Known(vec![]),
        });
        let b = Expr::constant("2");
        let tup = Expr::tuple(vec![a, b]);
        match infer_type(&tup) {
            Type::Tuple(fields) => assert_eq!(fields.len(), 2),
            other => panic!("expected tuple type, got {other:?}"),
        }
    }
}
