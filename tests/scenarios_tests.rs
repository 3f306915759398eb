//! Concrete end-to-end matcher scenarios.
//!
//! Each test below is a direct transcription of one of the six numbered
//! scenarios: name-hint sensitivity, commutative `multiply`, order-sensitive
//! `Shape`, `Not`, `Dominator`, and auto-jump.

use std::collections::HashMap;

use dataflow_pattern::{
    analyzer::PrimExpr, match_expr_pattern, match_pattern, types::ShapeKind, Expr, Pattern,
};

mod common;

#[test]
fn scenario_1_var_name_hints_must_agree() {
    common::init_tracing();

    let a = Expr::var("u");
    let b = Expr::var("v");
    let expr = Expr::call_op("add", vec![a, b]);

    let empty_hints = Pattern::call_op("add", vec![Pattern::var(""), Pattern::var("")]);
    assert!(match_pattern(&empty_hints, &expr));

    let named_hints = Pattern::call_op("add", vec![Pattern::var("x"), Pattern::var("y")]);
    assert!(!match_pattern(&named_hints, &expr));
}

#[test]
fn scenario_2_commutative_multiply_either_operand_order() {
    // Var("") matches any variable, so both args are represented as plain
    // variables here rather than one being a literal constant.
    let pattern = Pattern::call_op("multiply", vec![Pattern::var(""), Pattern::var("")]);

    let k = Expr::var("k");
    let one = Expr::var("one");
    assert!(match_pattern(&pattern, &Expr::call_op("multiply", vec![k.clone(), one.clone()])));
    assert!(match_pattern(&pattern, &Expr::call_op("multiply", vec![one, k])));
}

#[test]
fn scenario_3_shape_pattern_is_order_sensitive() {
    let tensor = Expr::var("t").with_shape(ShapeKind::Known(vec![PrimExpr::var("n"), PrimExpr::int(3)]));

    let matches = Pattern::has_shape(Pattern::wildcard(), vec![PrimExpr::var("n"), PrimExpr::int(3)]);
    assert!(match_pattern(&matches, &tensor));

    let wrong_dim = Pattern::has_shape(Pattern::wildcard(), vec![PrimExpr::var("n"), PrimExpr::int(4)]);
    assert!(!match_pattern(&wrong_dim, &tensor));

    let wrong_order = Pattern::has_shape(Pattern::wildcard(), vec![PrimExpr::int(3), PrimExpr::var("n")]);
    assert!(!match_pattern(&wrong_order, &tensor));
}

#[test]
fn scenario_4_not_constant() {
    let pattern = Pattern::not(Pattern::constant());
    assert!(!match_pattern(&pattern, &Expr::constant("1")));
    assert!(match_pattern(&pattern, &Expr::var("x")));
}

#[test]
fn scenario_5_dominator_finds_relu_descendant_through_a_wildcard_path() {
    // sigmoid(tanh(relu(y))): the immediate consumer `sigmoid` dominator-
    // matches via `path=Wildcard` through the intermediate `tanh`, down to
    // the `relu` call.
    let y = Expr::var("y");
    let relu = Expr::call_op("relu", vec![y]);
    let tanh = Expr::call_op("tanh", vec![relu]);
    let root = Expr::call_op("sigmoid", vec![tanh]);

    let pattern = Pattern::dominator(
        Pattern::wildcard(),
        Pattern::wildcard(),
        Pattern::call_op("relu", vec![Pattern::wildcard()]),
    );
    assert!(match_pattern(&pattern, &root));
}

#[test]
fn scenario_5_dominator_absent_descendant_fails() {
    let y = Expr::var("y");
    let tanh = Expr::call_op("tanh", vec![y]);
    let root = Expr::call_op("sigmoid", vec![tanh]);

    let pattern = Pattern::dominator(
        Pattern::wildcard(),
        Pattern::wildcard(),
        Pattern::call_op("relu", vec![Pattern::wildcard()]),
    );
    assert!(!match_pattern(&pattern, &root));
}

#[test]
fn scenario_6_autojump_toggles_value_visibility() {
    let v = Expr::var("v");
    let bound = Expr::call_op("add", vec![Expr::var("a"), Expr::var("b")]);
    let mut var2val = HashMap::new();
    var2val.insert(v.clone(), bound);

    let pattern = Pattern::call_op("add", vec![Pattern::wildcard(), Pattern::wildcard()]);
    assert!(match_expr_pattern(&pattern, &v, var2val.clone()));
    assert!(!match_pattern(&pattern, &v));
}
