//! The expression graph: a DAG overlay exposing each node's inputs and its
//! dominator-tree children.
//!
//! Two subtleties, both load-bearing for the `Dominator` pattern
//! (`crate::matcher::dominator`) and worth calling out:
//!
//! - A `Var`/`DataflowVar` node's graph input is its *bound value*
//!   (`var2val[node]`) when one is known, in addition to (for this crate,
//!   instead of, since leaves have none) its own `Expr::data_inputs()`. This
//!   is what lets a `Dominator` pattern anchored on a variable discover that
//!   the variable's bound call is, e.g., a `relu` — auto-jump and dominator
//!   matching share this one mechanism.
//! - `dominator_children` is computed by a real (if small) dominance
//!   algorithm — Cooper, Harvey & Kennedy's iterative engine — over that
//!   graph, rooted at the expression the `Matcher` was built with. In the
//!   common case of no shared sub-expressions this coincides exactly with
//!   plain containment (a node's dominator-tree children are its direct
//!   graph inputs); it only diverges when a sub-expression is reachable
//!   from root via more than one path, where the immediate dominator becomes
//!   the lowest common ancestor of all of that sub-expression's consumers.

use std::collections::HashMap;

use crate::expr::{Expr, ExprKind};

#[derive(Debug, Default)]
pub struct ExprGraph {
    inputs: HashMap<Expr, Vec<Expr>>,
    dominator_children: HashMap<Expr, Vec<Expr>>,
}

impl ExprGraph {
    /// Build the graph for `root`, resolving variable nodes through
    /// `var2val` so that dominator/auto-jump reasoning can see through
    /// bindings.
    pub fn build(root: &Expr, var2val: &HashMap<Expr, Expr>) -> Self {
        let (inputs, postorder) = Self::discover(root, var2val);
        let dominator_children = Self::compute_dominator_tree(root, &inputs, &postorder);
        ExprGraph {
            inputs,
            dominator_children,
        }
    }

    fn graph_input_list(node: &Expr, var2val: &HashMap<Expr, Expr>) -> Vec<Expr> {
        let mut ins = node.data_inputs();
        if matches!(node.kind(), ExprKind::Var(_) | ExprKind::DataflowVar(_)) {
            if let Some(bound) = var2val.get(node) {
                ins.push(bound.clone());
            }
        }
        ins
    }

    /// Discover every node reachable from `root` and its graph inputs,
    /// returning a postorder traversal (children before parents) usable to
    /// derive a reverse-postorder numbering for dominance.
    fn discover(
        root: &Expr,
        var2val: &HashMap<Expr, Expr>,
    ) -> (HashMap<Expr, Vec<Expr>>, Vec<Expr>) {
        enum Frame {
            Enter(Expr),
            Exit(Expr),
        }

        let mut inputs = HashMap::new();
        let mut postorder = Vec::new();
        let mut visited: HashMap<Expr, ()> = HashMap::new();
        let mut stack = vec![Frame::Enter(root.clone())];

        while let Some(frame) = stack.pop() {
            match frame {
                Frame::Enter(node) => {
                    if visited.contains_key(&node) {
                        continue;
                    }
                    visited.insert(node.clone(), ());
                    let ins = Self::graph_input_list(&node, var2val);
                    inputs.insert(node.clone(), ins.clone());
                    stack.push(Frame::Exit(node));
                    for child in ins.into_iter().rev() {
                        stack.push(Frame::Enter(child));
                    }
                }
                Frame::Exit(node) => postorder.push(node),
            }
        }

        (inputs, postorder)
    }

    fn compute_dominator_tree(
        root: &Expr,
        inputs: &HashMap<Expr, Vec<Expr>>,
        postorder: &[Expr],
    ) -> HashMap<Expr, Vec<Expr>> {
        // Reverse-postorder: root first.
        let rpo: Vec<Expr> = postorder.iter().rev().cloned().collect();
        let rpo_number: HashMap<Expr, usize> = rpo
            .iter()
            .enumerate()
            .map(|(i, e)| (e.clone(), i))
            .collect();

        let mut predecessors: HashMap<Expr, Vec<Expr>> = HashMap::new();
        for (node, ins) in inputs {
            for child in ins {
                predecessors.entry(child.clone()).or_default().push(node.clone());
            }
        }

        let mut idom: HashMap<Expr, Expr> = HashMap::new();
        idom.insert(root.clone(), root.clone());

        let mut changed = true;
        while changed {
            changed = false;
            for b in rpo.iter().skip(1) {
                let preds = match predecessors.get(b) {
                    Some(p) => p,
                    None => continue,
                };
                let mut new_idom: Option<Expr> = None;
                for p in preds {
                    if idom.contains_key(p) {
                        new_idom = Some(match new_idom {
                            None => p.clone(),
                            Some(cur) => Self::intersect(&cur, p, &idom, &rpo_number),
                        });
                    }
                }
                if let Some(ni) = new_idom {
                    if idom.get(b) != Some(&ni) {
                        idom.insert(b.clone(), ni);
                        changed = true;
                    }
                }
            }
        }

        let mut children: HashMap<Expr, Vec<Expr>> = HashMap::new();
        for (node, dominator) in &idom {
            if node == root {
                continue;
            }
            children.entry(dominator.clone()).or_default().push(node.clone());
        }
        children
    }

    fn intersect(
        a: &Expr,
        b: &Expr,
        idom: &HashMap<Expr, Expr>,
        rpo_number: &HashMap<Expr, usize>,
    ) -> Expr {
        let mut finger1 = a.clone();
        let mut finger2 = b.clone();
        while finger1 != finger2 {
            while rpo_number[&finger1] > rpo_number[&finger2] {
                finger1 = idom[&finger1].clone();
            }
            while rpo_number[&finger2] > rpo_number[&finger1] {
                finger2 = idom[&finger2].clone();
            }
        }
        finger1
    }

    /// Direct graph inputs of `node` (empty for nodes unreachable from
    /// root, or true leaves).
    pub fn inputs(&self, node: &Expr) -> &[Expr] {
        self.inputs.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Graph inputs of `node`, excluding the call operator position. Used
    /// by the dominator path-exploration rule, which only
    /// cares about data arguments.
    pub fn non_op_inputs(&self, node: &Expr) -> Vec<Expr> {
        let ins = self.inputs(node);
        if let ExprKind::Call { .. } = node.kind() {
            ins.iter().skip(1).cloned().collect()
        } else {
            ins.to_vec()
        }
    }

    /// Nodes whose immediate dominator (rooted at the graph's root) is
    /// `node`.
    pub fn dominator_children(&self, node: &Expr) -> &[Expr] {
        self.dominator_children
            .get(node)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
