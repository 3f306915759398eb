//! Coverage for pattern variants not already exercised by the per-module
//! unit tests: `ExprLiteral`, `GlobalVar`, `ExternFunc`, `RuntimeDepShape`,
//! `PrimArr`, `TupleGetItem`'s "any index", `Function`/`If` patterns, and
//! the back-reference memo invariant.

use dataflow_pattern::analyzer::PrimExpr;
use dataflow_pattern::types::ShapeKind;
use dataflow_pattern::{match_pattern, Expr, Pattern};

#[test]
fn expr_literal_matches_structurally_equal_expr_regardless_of_identity() {
    let a = Expr::call_op("add", vec![Expr::var("x"), Expr::var("y")]);
    let b = Expr::call_op("add", vec![Expr::var("x"), Expr::var("y")]);
    let pattern = Pattern::expr_literal(a);
    assert!(match_pattern(&pattern, &b));

    let different = Expr::call_op("add", vec![Expr::var("x"), Expr::var("z")]);
    assert!(!match_pattern(&pattern, &different));
}

#[test]
fn global_var_and_extern_func_respect_name_hints() {
    let g = Expr::global_var("main");
    assert!(match_pattern(&Pattern::global_var("main"), &g));
    assert!(!match_pattern(&Pattern::global_var("other"), &g));
    assert!(match_pattern(&Pattern::global_var(""), &g));

    let ext = Expr::extern_func("libc.malloc");
    assert!(match_pattern(&Pattern::extern_func("libc.malloc"), &ext));
    assert!(!match_pattern(&Pattern::extern_func("libc.free"), &ext));
}

#[test]
fn runtime_dep_shape_pattern_requires_runtime_dep_marker() {
    let dynamic = Expr::var("x").with_shape(ShapeKind::RuntimeDep);
    let known = Expr::var("y").with_shape(ShapeKind::Known(vec![PrimExpr::int(1)]));
    assert!(match_pattern(&Pattern::runtime_dep_shape(), &dynamic));
    assert!(!match_pattern(&Pattern::runtime_dep_shape(), &known));
}

#[test]
fn prim_array_pattern_compares_shape_expr_elementwise() {
    let shape = Expr::shape_expr(vec![PrimExpr::var("n"), PrimExpr::int(4)]);
    let matches = Pattern::prim_array(vec![PrimExpr::var("n"), PrimExpr::int(4)]);
    assert!(match_pattern(&matches, &shape));

    let mismatches = Pattern::prim_array(vec![PrimExpr::var("n"), PrimExpr::int(5)]);
    assert!(!match_pattern(&mismatches, &shape));
}

#[test]
fn tuple_get_item_any_index_accepts_every_concrete_index() {
    let t = Expr::tuple(vec![Expr::var("a"), Expr::var("b")]);
    let first = Expr::tuple_get_item(t.clone(), 0);
    let second = Expr::tuple_get_item(t.clone(), 1);

    let any_index = Pattern::tuple_get_item(Pattern::wildcard(), -1);
    assert!(match_pattern(&any_index, &first));
    assert!(match_pattern(&any_index, &second));

    let only_zero = Pattern::tuple_get_item(Pattern::wildcard(), 0);
    assert!(match_pattern(&only_zero, &first));
    assert!(!match_pattern(&only_zero, &second));
}

#[test]
fn function_and_if_patterns_recurse_into_every_position() {
    let param = Expr::var("p");
    let cond = Expr::var("c");
    let then_branch = Expr::constant("1");
    let else_branch = Expr::constant("2");
    let body = Expr::if_expr(cond.clone(), then_branch.clone(), else_branch.clone());
    let func = Expr::function(vec![param.clone()], body);

    let pattern = Pattern::function(
        Some(vec![Pattern::var("p")]),
        Pattern::if_pattern(Pattern::var("c"), Pattern::constant(), Pattern::constant()),
    );
    assert!(match_pattern(&pattern, &func));

    let wrong_arity = Pattern::function(Some(vec![]), Pattern::wildcard());
    assert!(!match_pattern(&wrong_arity, &func));
}

#[test]
fn reusing_a_pattern_handle_enforces_the_back_reference_invariant() {
    // `x` used twice in the pattern must bind to the same expression.
    let x = Pattern::var("");
    let pattern = Pattern::call_op("add", vec![x.clone(), x]);

    let same = Expr::var("a");
    let expr_same = Expr::call_op("add", vec![same.clone(), same]);
    assert!(match_pattern(&pattern, &expr_same));

    let expr_different = Expr::call_op("add", vec![Expr::var("a"), Expr::var("b")]);
    assert!(!match_pattern(&pattern, &expr_different));
}
