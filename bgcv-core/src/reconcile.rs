//! Keyed enter/update/exit reconciliation of scene children.
//!
//! The previous key set is diffed against the next one. New keys get freshly allocated
//! nodes, vanished keys are removed, and surviving keys keep their node (same id). Callers
//! that re-render an element from scratch clear the survivor's children themselves.

use std::collections::{HashMap, HashSet};

use crate::scene::{IdAllocator, Node, NodeId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOp {
    Create(String),
    Update(String),
    Remove(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
}

impl ReconcileReport {
    pub fn absorb(&mut self, ops: &[ReconcileOp]) {
        for op in ops {
            match op {
                ReconcileOp::Create(_) => self.created += 1,
                ReconcileOp::Update(_) => self.updated += 1,
                ReconcileOp::Remove(_) => self.removed += 1,
            }
        }
    }
}

/// Operations turning the `previous` key list into `next`. Removals come first, in
/// previous order; creates and updates follow in next order.
pub fn diff_keys(previous: &[String], next: &[String]) -> Vec<ReconcileOp> {
    let prev_set: HashSet<&str> = previous.iter().map(String::as_str).collect();
    let next_set: HashSet<&str> = next.iter().map(String::as_str).collect();
    let mut ops = Vec::with_capacity(previous.len().max(next.len()));
    for key in previous {
        if !next_set.contains(key.as_str()) {
            ops.push(ReconcileOp::Remove(key.clone()));
        }
    }
    for key in next {
        if prev_set.contains(key.as_str()) {
            ops.push(ReconcileOp::Update(key.clone()));
        } else {
            ops.push(ReconcileOp::Create(key.clone()));
        }
    }
    ops
}

/// Rebind `children` to `keys`. Children end up in `keys` order; `make` builds the node
/// for a new key. Unkeyed children are dropped.
pub fn reconcile_children<F>(
    children: &mut Vec<Node>,
    keys: &[String],
    ids: &mut IdAllocator,
    mut make: F,
) -> Vec<ReconcileOp>
where
    F: FnMut(NodeId, &str) -> Node,
{
    let previous: Vec<String> = children.iter().filter_map(|c| c.key.clone()).collect();
    let ops = diff_keys(&previous, keys);

    let mut existing: HashMap<String, Node> = children
        .drain(..)
        .filter_map(|c| c.key.clone().map(|k| (k, c)))
        .collect();

    for key in keys {
        let node = match existing.remove(key) {
            Some(node) => node,
            None => {
                let mut node = make(ids.alloc(), key);
                node.key = Some(key.clone());
                node
            }
        };
        children.push(node);
    }
    ops
}
