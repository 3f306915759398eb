//! The expression model: a tagged tree of IR nodes with stable structural
//! identity.
//!
//! Nodes are `Rc`-shared rather than boxed so that the same sub-expression
//! can appear as the input of more than one node — the DAG the matcher's
//! expression graph (`crate::expr_graph`) is built over. Two `Expr` handles
//! compare equal (`==`) by *pointer* identity: a freshly-built node with the
//! same shape as an existing one is still a different expression until the
//! two `Rc`s are literally cloned from each other. Deep, value-based
//! comparison is a separate operation:
//! [`crate::structural_eq::structural_equal`].

use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::analyzer::PrimExpr;
use crate::types::{ShapeKind, Type};

/// An attribute value attached to a `Call` or `Function` node, or compared
/// against by an `Attr` pattern.
#[derive(Debug, Clone)]
pub enum AttrValue {
    Int(i64),
    Float(f64),
    Str(String),
    /// A dtype spelled as a string, e.g. `"float32"` — compared the same way
    /// as `Str` regardless of whether the IR side is a string-imm or a
    /// string object.
    DType(String),
    /// An arbitrary IR object, compared via the structural-equal oracle.
    Object(Expr),
}

impl PartialEq for AttrValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttrValue::Int(a), AttrValue::Int(b)) => a == b,
            (AttrValue::Float(a), AttrValue::Float(b)) => a == b,
            (AttrValue::Str(a), AttrValue::Str(b)) => a == b,
            (AttrValue::DType(a), AttrValue::DType(b)) => a == b,
            (AttrValue::Str(a), AttrValue::DType(b)) | (AttrValue::DType(a), AttrValue::Str(b)) => {
                a == b
            }
            (AttrValue::Object(a), AttrValue::Object(b)) => {
                crate::structural_eq::structural_equal(
                    a,
                    b,
                    crate::structural_eq::StructuralEqOptions {
                        map_free_var: false,
                        assert_on_mismatch: true,
                    },
                )
            }
            _ => false,
        }
    }
}

/// Attributes carried by a `Call` or `Function` expression node.
pub type AttrMap = BTreeMap<String, AttrValue>;

/// Opaque constant payload. The matcher never inspects constant *values*,
/// so this is kept as a display-only label rather than a typed literal.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantValue(pub String);

/// The tagged variant of an expression node.
#[derive(Debug, Clone)]
pub enum ExprKind {
    Constant(ConstantValue),
    /// A regular (non-dataflow) local variable. Empty name hint means
    /// "anonymous" for construction purposes; matching against a `Var`
    /// *pattern* with an empty hint always succeeds regardless of the
    /// expression's own name.
    Var(String),
    DataflowVar(String),
    GlobalVar(String),
    ExternFunc(String),
    Tuple(Vec<Expr>),
    TupleGetItem {
        tuple: Expr,
        /// `-1` is reserved by the *pattern* side for "any index"; on the
        /// expression side this is always a concrete index.
        index: i64,
    },
    Call {
        op: Expr,
        args: Vec<Expr>,
        attrs: AttrMap,
    },
    Function {
        params: Vec<Expr>,
        body: Expr,
        attrs: AttrMap,
    },
    If {
        cond: Expr,
        then_branch: Expr,
        else_branch: Expr,
    },
    ShapeExpr(Vec<PrimExpr>),
    Op(String),
}

struct ExprNode {
    kind: ExprKind,
    checked_type: Option<Type>,
    shape: Option<ShapeKind>,
}

/// A handle to an expression node, cheap to clone, compared by identity.
#[derive(Clone)]
pub struct Expr(Rc<ExprNode>);

impl Expr {
    fn from_kind(kind: ExprKind) -> Self {
        Expr(Rc::new(ExprNode {
            kind,
            checked_type: None,
            shape: None,
        }))
    }

    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    pub fn checked_type(&self) -> Option<&Type> {
        self.0.checked_type.as_ref()
    }

    pub fn shape(&self) -> Option<&ShapeKind> {
        self.0.shape.as_ref()
    }

    /// Attach a checked type, producing a new handle — expressions are
    /// immutable once built, constructed as fully-formed trees bottom-up.
    pub fn with_type(self, ty: Type) -> Self {
        Expr(Rc::new(ExprNode {
            kind: self.0.kind.clone(),
            checked_type: Some(ty),
            shape: self.0.shape.clone(),
        }))
    }

    pub fn with_shape(self, shape: ShapeKind) -> Self {
        Expr(Rc::new(ExprNode {
            kind: self.0.kind.clone(),
            checked_type: self.0.checked_type.clone(),
            shape: Some(shape),
        }))
    }

    /// A stable, process-local identity for this node — the address of its
    /// backing allocation. Used as a map key by the expression graph and by
    /// `var2val`; never persisted or compared across processes.
    pub fn ptr_id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn constant(label: impl Into<String>) -> Self {
        Self::from_kind(ExprKind::Constant(ConstantValue(label.into())))
    }

    pub fn var(name: impl Into<String>) -> Self {
        Self::from_kind(ExprKind::Var(name.into()))
    }

    pub fn dataflow_var(name: impl Into<String>) -> Self {
        Self::from_kind(ExprKind::DataflowVar(name.into()))
    }

    pub fn global_var(name: impl Into<String>) -> Self {
        Self::from_kind(ExprKind::GlobalVar(name.into()))
    }

    pub fn extern_func(symbol: impl Into<String>) -> Self {
        Self::from_kind(ExprKind::ExternFunc(symbol.into()))
    }

    pub fn op(name: impl Into<String>) -> Self {
        Self::from_kind(ExprKind::Op(name.into()))
    }

    pub fn tuple(fields: Vec<Expr>) -> Self {
        Self::from_kind(ExprKind::Tuple(fields))
    }

    pub fn tuple_get_item(tuple: Expr, index: i64) -> Self {
        Self::from_kind(ExprKind::TupleGetItem { tuple, index })
    }

    pub fn call(op: Expr, args: Vec<Expr>) -> Self {
        Self::from_kind(ExprKind::Call {
            op,
            args,
            attrs: AttrMap::new(),
        })
    }

    pub fn call_with_attrs(op: Expr, args: Vec<Expr>, attrs: AttrMap) -> Self {
        Self::from_kind(ExprKind::Call { op, args, attrs })
    }

    pub fn call_op(name: impl Into<String>, args: Vec<Expr>) -> Self {
        Self::call(Self::op(name), args)
    }

    pub fn function(params: Vec<Expr>, body: Expr) -> Self {
        Self::from_kind(ExprKind::Function {
            params,
            body,
            attrs: AttrMap::new(),
        })
    }

    pub fn if_expr(cond: Expr, then_branch: Expr, else_branch: Expr) -> Self {
        Self::from_kind(ExprKind::If {
            cond,
            then_branch,
            else_branch,
        })
    }

    pub fn shape_expr(values: Vec<PrimExpr>) -> Self {
        Self::from_kind(ExprKind::ShapeExpr(values))
    }

    /// Direct data-flow inputs of this node (used by the expression graph
    /// builder). The call's `op` is included — callers that need to
    /// distinguish it from the argument positions (the dominator
    /// path-exploration rule) do so explicitly.
    pub fn data_inputs(&self) -> Vec<Expr> {
        match self.kind() {
            ExprKind::Constant(_)
            | ExprKind::Var(_)
            | ExprKind::DataflowVar(_)
            | ExprKind::GlobalVar(_)
            | ExprKind::ExternFunc(_)
            | ExprKind::Op(_)
            | ExprKind::ShapeExpr(_) => vec![],
            ExprKind::Tuple(fields) => fields.clone(),
            ExprKind::TupleGetItem { tuple, .. } => vec![tuple.clone()],
            ExprKind::Call { op, args, .. } => {
                let mut inputs = vec![op.clone()];
                inputs.extend(args.iter().cloned());
                inputs
            }
            ExprKind::Function { params, body, .. } => {
                let mut inputs = params.clone();
                inputs.push(body.clone());
                inputs
            }
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => vec![cond.clone(), then_branch.clone(), else_branch.clone()],
        }
    }
}

impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Expr {}

impl Hash for Expr {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.ptr_id().hash(state);
    }
}

impl fmt::Debug for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Expr#{:x}({:?})", self.ptr_id(), self.kind())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_structurally_identical_nodes_are_distinct_by_identity() {
        let a = Expr::var("x");
        let b = Expr::var("x");
        assert_ne!(a, b);
        assert_eq!(a.clone(), a);
    }

    #[test]
    fn data_inputs_of_call_includes_op() {
        let op = Expr::op("add");
        let a = Expr::var("a");
        let b = Expr::var("b");
        let call = Expr::call(op.clone(), vec![a.clone(), b.clone()]);
        let inputs = call.data_inputs();
        assert_eq!(inputs.len(), 3);
        assert_eq!(inputs[0], op);
        assert_eq!(inputs[1], a);
        assert_eq!(inputs[2], b);
    }

    #[test]
    fn tuple_get_item_input_is_the_tuple() {
        let t = Expr::tuple(vec![Expr::var("a")]);
        let get = Expr::tuple_get_item(t.clone(), 0);
        assert_eq!(get.data_inputs(), vec![t]);
    }
}
