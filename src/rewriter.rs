//! The statement rewriter: an external collaborator.
//!
//! The matcher only recognizes; bulk var-replacement, insertion, and unused
//! removal over a dataflow block is a separate subsystem whose interface is
//! fixed without prescribing its algorithm. `Function` and `IRModule` here
//! are minimal stand-ins sufficient to exercise that interface's documented
//! invariants (fresh-name collision avoidance, transitive unused removal) —
//! full IR construction is out of scope.

use std::collections::{HashMap, HashSet};

use crate::error::{MatcherError, MatcherResult};
use crate::expr::{Expr, ExprKind};

/// A single binding `var = value` inside a dataflow block, in emission
/// order.
#[derive(Debug, Clone)]
pub struct Binding {
    pub var: Expr,
    pub value: Expr,
}

/// A minimal stand-in for a Relax dataflow block: an ordered sequence of
/// bindings plus the set of variables the enclosing function returns.
#[derive(Debug, Clone, Default)]
pub struct DataflowBlock {
    pub bindings: Vec<Binding>,
    pub outputs: HashSet<usize>,
}

impl DataflowBlock {
    pub fn new(bindings: Vec<Binding>, outputs: HashSet<usize>) -> Self {
        DataflowBlock { bindings, outputs }
    }

    fn index_of(&self, var: &Expr) -> Option<usize> {
        self.bindings.iter().position(|b| &b.var == var)
    }

    fn existing_names(&self) -> HashSet<String> {
        self.bindings
            .iter()
            .filter_map(|b| match b.var.kind() {
                ExprKind::Var(name) | ExprKind::DataflowVar(name) => Some(name.clone()),
                _ => None,
            })
            .collect()
    }
}

/// A minimal stand-in for the enclosing function: a pointer to the original
/// function, for identification.
#[derive(Debug, Clone, Default)]
pub struct Function {
    pub name: String,
    pub block: DataflowBlock,
}

/// A minimal stand-in for a whole module of functions.
#[derive(Debug, Clone, Default)]
pub struct IRModule {
    pub functions: HashMap<String, Function>,
}

/// Bulk rewriter over one dataflow block.
///
/// Holds the block being mutated, the function it came from (kept around so
/// `mutated_func` can hand back a function with the same identity), a
/// `var -> users` inverse map used by [`remove_unused`](Self::remove_unused),
/// and a monotonic counter driving fresh-name generation.
pub struct StatementRewriter {
    block: DataflowBlock,
    original_func: Function,
    users: HashMap<Expr, HashSet<usize>>,
    fresh_counter: u64,
}

impl StatementRewriter {
    pub fn new(original_func: Function) -> Self {
        let block = original_func.block.clone();
        let users = Self::build_user_map(&block);
        StatementRewriter {
            block,
            original_func,
            users,
            fresh_counter: 0,
        }
    }

    fn build_user_map(block: &DataflowBlock) -> HashMap<Expr, HashSet<usize>> {
        let mut users: HashMap<Expr, HashSet<usize>> = HashMap::new();
        for (i, binding) in block.bindings.iter().enumerate() {
            for input in binding.value.data_inputs() {
                users.entry(input).or_default().insert(i);
            }
        }
        users
    }

    /// Replace every use of `old_var` with `new_var` across every binding's
    /// right-hand side`).
    pub fn replace_all_uses(&mut self, old_var: &Expr, new_var: &Expr) {
        for binding in &mut self.block.bindings {
            binding.value = Self::substitute(&binding.value, old_var, new_var);
        }
        self.users = Self::build_user_map(&self.block);
    }

    fn substitute(expr: &Expr, old_var: &Expr, new_var: &Expr) -> Expr {
        if expr == old_var {
            return new_var.clone();
        }
        match expr.kind() {
            ExprKind::Tuple(fields) => Expr::tuple(
                fields.iter().map(|f| Self::substitute(f, old_var, new_var)).collect(),
            ),
            ExprKind::TupleGetItem { tuple, index } => {
                Expr::tuple_get_item(Self::substitute(tuple, old_var, new_var), *index)
            }
            ExprKind::Call { op, args, attrs } => Expr::call_with_attrs(
                Self::substitute(op, old_var, new_var),
                args.iter().map(|a| Self::substitute(a, old_var, new_var)).collect(),
                attrs.clone(),
            ),
            ExprKind::If {
                cond,
                then_branch,
                else_branch,
            } => Expr::if_expr(
                Self::substitute(cond, old_var, new_var),
                Self::substitute(then_branch, old_var, new_var),
                Self::substitute(else_branch, old_var, new_var),
            ),
            _ => expr.clone(),
        }
    }

    /// Append a binding to the end of the block.
    pub fn add(&mut self, var: Expr, value: Expr) {
        let idx = self.block.bindings.len();
        for input in value.data_inputs() {
            self.users.entry(input).or_default().insert(idx);
        }
        self.block.bindings.push(Binding { var, value });
    }

    /// Append a binding bound to a freshly generated regular variable, and
    /// return the variable it allocated.
    pub fn add_fresh(&mut self, value: Expr) -> Expr {
        let var = Expr::var(self.fresh_name("lv"));
        self.add(var.clone(), value);
        var
    }

    /// As [`add_fresh`](Self::add_fresh) but allocates a dataflow variable.
    pub fn add_fresh_dataflow(&mut self, value: Expr) -> Expr {
        let var = Expr::dataflow_var(self.fresh_name("lv"));
        self.add(var.clone(), value);
        var
    }

    /// Generate a name not colliding with any existing name in the block,
    /// of the form `{prefix}{n}`, bumping the counter until it's unused.
    fn fresh_name(&mut self, prefix: &str) -> String {
        let existing = self.block.existing_names();
        loop {
            let candidate = format!("{prefix}{}", self.fresh_counter);
            self.fresh_counter += 1;
            if !existing.contains(&candidate) {
                return candidate;
            }
        }
    }

    /// Remove `var`'s binding if nothing still uses it and it isn't an
    /// output, then transitively remove whatever that binding's own inputs
    /// no longer need either.
    pub fn remove_unused(&mut self, var: &Expr) -> MatcherResult<()> {
        let idx = self.block.index_of(var).ok_or_else(|| {
            MatcherError::VarNotFound(format!("{var:?}"))
        })?;
        self.remove_unused_at(idx);
        Ok(())
    }

    fn remove_unused_at(&mut self, idx: usize) {
        if self.block.outputs.contains(&idx) {
            return;
        }
        if self
            .users
            .get(&self.block.bindings[idx].var)
            .is_some_and(|u| !u.is_empty())
        {
            return;
        }
        let removed = self.block.bindings.remove(idx);
        // Drop the removed binding's own usage edges before renumbering,
        // while `idx` still refers to its pre-removal position.
        let inputs = removed.value.data_inputs();
        for input in &inputs {
            if let Some(user_set) = self.users.get_mut(input) {
                user_set.remove(&idx);
            }
        }
        self.reindex_after_removal(idx);
        for input in &inputs {
            if let Some(input_idx) = self.block.index_of(input) {
                let now_unused = self.users.get(input).map(HashSet::is_empty).unwrap_or(true);
                if now_unused {
                    self.remove_unused_at(input_idx);
                }
            }
        }
    }

    fn reindex_after_removal(&mut self, removed_idx: usize) {
        self.block.outputs = self
            .block
            .outputs
            .iter()
            .filter_map(|&i| {
                if i == removed_idx {
                    None
                } else if i > removed_idx {
                    Some(i - 1)
                } else {
                    Some(i)
                }
            })
            .collect();
        for users in self.users.values_mut() {
            *users = users
                .iter()
                .filter_map(|&i| {
                    if i == removed_idx {
                        None
                    } else if i > removed_idx {
                        Some(i - 1)
                    } else {
                        Some(i)
                    }
                })
                .collect();
        }
    }

    /// Remove every binding in the block not transitively contributing to
    /// an output, repeating until a fixpoint.
    pub fn remove_all_unused(&mut self) {
        loop {
            let before = self.block.bindings.len();
            let candidates: Vec<usize> = (0..self.block.bindings.len())
                .filter(|i| !self.block.outputs.contains(i))
                .collect();
            for idx in candidates.into_iter().rev() {
                if idx < self.block.bindings.len() {
                    self.remove_unused_at(idx);
                }
            }
            if self.block.bindings.len() == before {
                break;
            }
        }
    }

    pub fn mutated_dataflow_block(&self) -> DataflowBlock {
        self.block.clone()
    }

    pub fn mutated_func(&self) -> Function {
        Function {
            name: self.original_func.name.clone(),
            block: self.block.clone(),
        }
    }

    pub fn mutate_irmodule(&self, module: &IRModule) -> IRModule {
        let mut functions = module.functions.clone();
        functions.insert(self.original_func.name.clone(), self.mutated_func());
        IRModule { functions }
    }
}
