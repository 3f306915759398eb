//! Attribute constraint matching and the `match_retvalue` collaborator.

use crate::error::{MatcherError, MatcherResult};
use crate::expr::{AttrMap, AttrValue, Expr, ExprKind};
use crate::pattern::Pattern;
use crate::registry::op_attrs;

use super::Matcher;

/// `Attr(inner, attrs)`: `inner` must match, and every key in `attrs` must be
/// satisfied against the expression's own attributes, across the three
/// expression shapes an `Attr` pattern can wrap.
pub(crate) fn match_attr(
    matcher: &mut Matcher,
    inner: &Pattern,
    expected: &AttrMap,
    expr: &Expr,
) -> MatcherResult<bool> {
    if !matcher.visit(inner, expr)? {
        return Ok(false);
    }
    match expr.kind() {
        // Op expression: each attribute name must resolve through a
        // registered op-attribute map that covers this op.
        ExprKind::Op(op_name) => {
            for (map_name, expected_value) in expected.iter() {
                if !op_attrs::has_attr_map(map_name) {
                    return Ok(false);
                }
                match op_attrs::attr_map(map_name).get(op_name) {
                    Some(value) => {
                        if !match_retvalue(expected_value, value)? {
                            return Ok(false);
                        }
                    }
                    None => return Ok(false),
                }
            }
            Ok(true)
        }
        ExprKind::Call { attrs, .. } => {
            for (key, expected_value) in expected.iter() {
                match attrs.get(key) {
                    Some(value) => {
                        if !match_retvalue(expected_value, value)? {
                            return Ok(false);
                        }
                    }
                    None => return Ok(false),
                }
            }
            Ok(true)
        }
        // Function expression: every name must be present with a
        // structurally equal value — no `match_retvalue` unification here,
        // a plain equality check.
        ExprKind::Function { attrs, .. } => Ok(expected
            .iter()
            .all(|(key, expected_value)| attrs.get(key) == Some(expected_value))),
        _ => Ok(false),
    }
}

/// Compare a pattern-declared attribute value against the one actually
/// attached to an expression.
///
/// Numbers compare by value, strings and dtype-strings are unified (the IR
/// doesn't distinguish "a dtype spelled as a string" from a plain string
/// attribute), and objects defer to [`crate::structural_eq::structural_equal`].
/// Comparing an object against a scalar is a contract violation rather than
/// an ordinary mismatch, since no pattern author should be attaching a
/// sub-expression where a number or string is expected.
pub fn match_retvalue(expected: &AttrValue, actual: &AttrValue) -> MatcherResult<bool> {
    use AttrValue::{DType, Float, Int, Object, Str};
    match (expected, actual) {
        (Object(_), Int(_) | Float(_) | Str(_) | DType(_))
        | (Int(_) | Float(_) | Str(_) | DType(_), Object(_)) => Err(
            MatcherError::UnsupportedAttrValue(format!("{expected:?} vs {actual:?}")),
        ),
        _ => Ok(expected == actual),
    }
}
