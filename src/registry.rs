//! The scripting-layer registration surface and the op
//! attribute registry consulted by `Attr` patterns over `Op` expressions.
//!
//! Real FFI glue to a scripting front-end is out of scope: this
//! module only models the two things the matcher itself actually depends on
//! from that layer — a stable name table a binding generator could key off
//! of, and the global attribute maps op registrations normally live in.

use std::collections::HashMap;
use std::sync::Mutex;

use once_cell::sync::Lazy;

use crate::expr::AttrValue;

/// Stable symbolic name for the non-auto-jumping entry point, matching the
/// scripting registry name a binding generator would key off of.
pub const MATCH_PATTERN_NAME: &str = "relax.dataflow_pattern.match";

/// Stable symbolic name for the auto-jumping entry point.
pub const MATCH_EXPR_PATTERN_NAME: &str = "relax.dataflow_pattern.match_expr";

/// A minimal seam a binding generator could use to discover the matcher's
/// stable entry points without this crate depending on any particular
/// scripting runtime.
pub trait Registry {
    fn names(&self) -> &'static [&'static str];
}

/// The default, no-op registry: just the two names above.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultRegistry;

impl Registry for DefaultRegistry {
    fn names(&self) -> &'static [&'static str] {
        &[MATCH_PATTERN_NAME, MATCH_EXPR_PATTERN_NAME]
    }
}

/// Op attribute maps: `has_attr_map(name)`, `attr_map(name)[op]`.
///
/// In the real compiler these maps are populated at op-registration time,
/// well before any pattern match runs; here they're exposed as a small
/// process-global table callers populate with [`register`] — the matcher
/// only ever reads from it.
pub mod op_attrs {
    use super::{AttrValue, HashMap, Lazy, Mutex};

    type AttrMapTable = HashMap<String, HashMap<String, AttrValue>>;

    static MAPS: Lazy<Mutex<AttrMapTable>> = Lazy::new(|| Mutex::new(HashMap::new()));

    /// Register `op`'s value under the attribute map named `map_name`.
    pub fn register(map_name: impl Into<String>, op: impl Into<String>, value: AttrValue) {
        let mut maps = MAPS.lock().expect("op attr registry poisoned");
        maps.entry(map_name.into())
            .or_default()
            .insert(op.into(), value);
    }

    /// Whether an attribute map named `name` has been registered at all.
    pub fn has_attr_map(name: &str) -> bool {
        MAPS.lock().expect("op attr registry poisoned").contains_key(name)
    }

    /// The attribute map named `name`, or an empty map if none was
    /// registered (callers should check [`has_attr_map`] first to
    /// distinguish "no such map" from "map has no entry for this op").
    pub fn attr_map(name: &str) -> HashMap<String, AttrValue> {
        MAPS.lock()
            .expect("op attr registry poisoned")
            .get(name)
            .cloned()
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_exposes_both_stable_names() {
        let names = DefaultRegistry.names();
        assert!(names.contains(&MATCH_PATTERN_NAME));
        assert!(names.contains(&MATCH_EXPR_PATTERN_NAME));
    }

    #[test]
    fn unregistered_attr_map_reports_absent() {
        assert!(!op_attrs::has_attr_map("TNoSuchMapEver"));
    }
}
