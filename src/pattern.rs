//! The pattern model: a parallel tagged tree of pattern nodes mirroring
//! `Expr`'s variants plus combinators.
//!
//! Like `Expr`, a `Pattern` handle compares by pointer identity — the memo
//! table in `crate::matcher` keys on exactly that identity, not on pattern
//! *content*: a pattern variable's memo entry never changes across
//! different expressions, so attempting to re-bind a memoized pattern to a
//! different expression fails. Two patterns built the same way are still
//! two different `Pattern`s unless the same handle is reused.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::analyzer::PrimExpr;
use crate::expr::{AttrMap, Expr};
use crate::types::{DType, Type};

/// The tagged variant of a pattern node.
pub enum PatternKind {
    Wildcard,
    Constant,
    Var(String),
    DataflowVar(String),
    GlobalVar(String),
    ExternFunc(String),
    /// Matches iff the expression is structurally equal to a fixed, already
    /// built `Expr`.
    ExprLiteral(Expr),
    RuntimeDepShape,

    /// `None` fields means arity-unconstrained.
    Tuple(Option<Vec<Pattern>>),
    /// `-1` means "any index".
    TupleGetItem { tuple: Pattern, index: i64 },
    Call {
        op: Pattern,
        args: Option<Vec<Pattern>>,
    },
    Function {
        params: Option<Vec<Pattern>>,
        body: Pattern,
    },
    If {
        cond: Pattern,
        then_branch: Pattern,
        else_branch: Pattern,
    },

    Attr {
        inner: Pattern,
        attrs: AttrMap,
    },
    Type {
        inner: Pattern,
        ty: Type,
    },
    Shape {
        inner: Pattern,
        dims: Vec<PrimExpr>,
    },
    DataType {
        inner: Pattern,
        dtype: DType,
    },
    PrimArr(Vec<PrimExpr>),

    Or(Pattern, Pattern),
    And(Pattern, Pattern),
    Not(Pattern),
    Dominator {
        child: Pattern,
        path: Pattern,
        parent: Pattern,
    },
}

/// A handle to a pattern node, cheap to clone, compared by identity.
#[derive(Clone)]
pub struct Pattern(Rc<PatternKind>);

impl Pattern {
    fn new(kind: PatternKind) -> Self {
        Pattern(Rc::new(kind))
    }

    pub fn kind(&self) -> &PatternKind {
        &self.0
    }

    pub fn ptr_id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn wildcard() -> Self {
        Self::new(PatternKind::Wildcard)
    }

    pub fn constant() -> Self {
        Self::new(PatternKind::Constant)
    }

    pub fn var(name_hint: impl Into<String>) -> Self {
        Self::new(PatternKind::Var(name_hint.into()))
    }

    pub fn dataflow_var(name_hint: impl Into<String>) -> Self {
        Self::new(PatternKind::DataflowVar(name_hint.into()))
    }

    pub fn global_var(name_hint: impl Into<String>) -> Self {
        Self::new(PatternKind::GlobalVar(name_hint.into()))
    }

    pub fn extern_func(symbol: impl Into<String>) -> Self {
        Self::new(PatternKind::ExternFunc(symbol.into()))
    }

    pub fn expr_literal(expr: Expr) -> Self {
        Self::new(PatternKind::ExprLiteral(expr))
    }

    pub fn runtime_dep_shape() -> Self {
        Self::new(PatternKind::RuntimeDepShape)
    }

    pub fn tuple(fields: Option<Vec<Pattern>>) -> Self {
        Self::new(PatternKind::Tuple(fields))
    }

    pub fn tuple_get_item(tuple: Pattern, index: i64) -> Self {
        Self::new(PatternKind::TupleGetItem { tuple, index })
    }

    pub fn call(op: Pattern, args: Option<Vec<Pattern>>) -> Self {
        Self::new(PatternKind::Call { op, args })
    }

    /// Convenience: a call to a named op with fully constrained arguments.
    pub fn call_op(name: impl Into<String>, args: Vec<Pattern>) -> Self {
        Self::call(Pattern::op_name(name), Some(args))
    }

    /// An op-name pattern, matched via `ExprLiteral` against `Expr::op`.
    pub fn op_name(name: impl Into<String>) -> Self {
        Self::expr_literal(Expr::op(name))
    }

    pub fn function(params: Option<Vec<Pattern>>, body: Pattern) -> Self {
        Self::new(PatternKind::Function { params, body })
    }

    pub fn if_pattern(cond: Pattern, then_branch: Pattern, else_branch: Pattern) -> Self {
        Self::new(PatternKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn attr(inner: Pattern, attrs: AttrMap) -> Self {
        Self::new(PatternKind::Attr { inner, attrs })
    }

    pub fn has_type(inner: Pattern, ty: Type) -> Self {
        Self::new(PatternKind::Type { inner, ty })
    }

    pub fn has_shape(inner: Pattern, dims: Vec<PrimExpr>) -> Self {
        Self::new(PatternKind::Shape { inner, dims })
    }

    pub fn has_dtype(inner: Pattern, dtype: DType) -> Self {
        Self::new(PatternKind::DataType { inner, dtype })
    }

    pub fn prim_array(values: Vec<PrimExpr>) -> Self {
        Self::new(PatternKind::PrimArr(values))
    }

    pub fn or(left: Pattern, right: Pattern) -> Self {
        Self::new(PatternKind::Or(left, right))
    }

    pub fn and(left: Pattern, right: Pattern) -> Self {
        Self::new(PatternKind::And(left, right))
    }

    pub fn not(reject: Pattern) -> Self {
        Self::new(PatternKind::Not(reject))
    }

    pub fn dominator(child: Pattern, path: Pattern, parent: Pattern) -> Self {
        Self::new(PatternKind::Dominator {
            child,
            path,
            parent,
        })
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Pattern {}

impl Hash for Pattern {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr_id().hash(state);
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pattern#{:x}", self.ptr_id())
    }
}
