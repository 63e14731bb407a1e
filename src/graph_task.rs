//! Traversals over the DAG reachable from a root node

use std::collections::HashSet;

use crate::autograd::{Node, NodeId};

/// The nodes reachable from a root, in topological order.
///
/// Every node appears after all of its operands (postorder), each node once,
/// and the root last. Built with an explicit stack so deep chains do not
/// exhaust the call stack.
pub struct GraphTask {
    order: Vec<Node>,
}

impl GraphTask {
    pub fn new(graph_root: &Node) -> Self {
        let mut order = Vec::new();
        let mut seen: HashSet<NodeId> = HashSet::new();
        // (node, operands already pushed)
        let mut stack = vec![(graph_root.clone(), false)];

        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            if !seen.insert(node.id()) {
                continue;
            }
            let operands: Vec<Node> = node.operands().into_iter().cloned().collect();
            stack.push((node, true));
            // reversed so the first operand is finished first
            for operand in operands.into_iter().rev() {
                if !seen.contains(&operand.id()) {
                    stack.push((operand, false));
                }
            }
        }

        GraphTask { order }
    }

    pub fn order(&self) -> &[Node] {
        &self.order
    }

    pub fn into_order(self) -> Vec<Node> {
        self.order
    }

    pub fn root(&self) -> Option<&Node> {
        self.order.last()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

pub fn topological_order(root: &Node) -> Vec<Node> {
    GraphTask::new(root).into_order()
}

/// Reset the gradient of `root` and of every node below it to zero.
pub fn zero_grad_recursive(root: &Node) {
    let mut stack = vec![root.clone()];
    let mut seen = HashSet::new();
    seen.insert(root.id());

    while let Some(node) = stack.pop() {
        node.zero_grad();
        for operand in node.operands() {
            if seen.insert(operand.id()) {
                stack.push(operand.clone());
            }
        }
    }
}

/// Every node reachable from `root` in topological order, leaves and
/// intermediate results alike. Callers filter with [`Node::is_leaf`] when
/// they only want trainable inputs.
pub fn collect_parameters(root: &Node) -> Vec<Node> {
    topological_order(root)
}
