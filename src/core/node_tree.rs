/*
 * Read and search operations over a sequence of root `OutlineNode`s, plus the
 * recursive subtree removal used by delete. Every traversal here is depth-first
 * and pre-order (a node before its children, siblings left to right); that is
 * the canonical order of the outline everywhere else in the application.
 */
use super::models::{NodeId, OutlineNode};
use std::collections::HashSet;

/// Returns the first node with `id` in pre-order, if any.
pub fn find_by_id(roots: &[OutlineNode], id: NodeId) -> Option<&OutlineNode> {
    for node in roots {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_by_id(&node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn find_by_id_mut(roots: &mut [OutlineNode], id: NodeId) -> Option<&mut OutlineNode> {
    for node in roots.iter_mut() {
        if node.id == id {
            return Some(node);
        }
        if let Some(found) = find_by_id_mut(&mut node.children, id) {
            return Some(found);
        }
    }
    None
}

pub fn contains_id(roots: &[OutlineNode], id: NodeId) -> bool {
    find_by_id(roots, id).is_some()
}

/*
 * Detaches the node with `id` (and with it its whole subtree) from wherever it
 * sits in the tree and hands it back. Ids are globally unique, so at most one
 * node can match; the search still descends into every surviving node until it
 * is found. Returns `None` when no node matched and the tree is untouched.
 */
pub fn remove_by_id(roots: &mut Vec<OutlineNode>, id: NodeId) -> Option<OutlineNode> {
    if let Some(index) = roots.iter().position(|node| node.id == id) {
        return Some(roots.remove(index));
    }
    for node in roots.iter_mut() {
        if let Some(removed) = remove_by_id(&mut node.children, id) {
            return Some(removed);
        }
    }
    None
}

/// All ids in the tree, in canonical pre-order.
pub fn collect_ids(roots: &[OutlineNode]) -> Vec<NodeId> {
    let mut ids = Vec::new();
    collect_ids_recursive(roots, &mut ids);
    ids
}

fn collect_ids_recursive(nodes: &[OutlineNode], ids: &mut Vec<NodeId>) {
    for node in nodes {
        ids.push(node.id);
        collect_ids_recursive(&node.children, ids);
    }
}

// The node's own id followed by every descendant id.
pub fn subtree_ids(node: &OutlineNode) -> Vec<NodeId> {
    let mut ids = vec![node.id];
    collect_ids_recursive(&node.children, &mut ids);
    ids
}

pub fn max_id(roots: &[OutlineNode]) -> Option<NodeId> {
    roots
        .iter()
        .map(|node| match max_id(&node.children) {
            Some(child_max) => child_max.max(node.id),
            None => node.id,
        })
        .max()
}

pub fn count_nodes(roots: &[OutlineNode]) -> usize {
    roots
        .iter()
        .map(|node| 1 + count_nodes(&node.children))
        .sum()
}

/*
 * Returns the first id that occurs a second time in pre-order. A tree built
 * through the mutation engine never has one; externally supplied documents
 * might.
 */
pub fn find_duplicate_id(roots: &[OutlineNode]) -> Option<NodeId> {
    let mut seen = HashSet::new();
    collect_ids(roots).into_iter().find(|id| !seen.insert(*id))
}
