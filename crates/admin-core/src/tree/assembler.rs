// ============================================================================
// Admin Core - Tree Assembler
// File: crates/admin-core/src/tree/assembler.rs
// Description: Flat menu rows -> rooted forest
// ============================================================================
//! Builds the menu forest from flat records in two passes over the input.
//!
//! Assembly never fails. A record whose parent cannot be resolved (an orphan),
//! a record that names itself as parent, and records caught in a stored cycle
//! are promoted to roots and reported on the returned [`MenuForest`] so the
//! caller can log the degradation.

use std::collections::HashMap;

use crate::domain::{MenuId, MenuNode};

/// A menu node together with its assembled children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub node: MenuNode,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn id(&self) -> MenuId {
        self.node.id
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MenuForest {
    pub roots: Vec<TreeNode>,
    /// Records whose `parent_id` did not resolve to any supplied record.
    pub orphans: Vec<MenuId>,
    /// Records promoted to root to break a self-reference or cycle.
    pub cycle_breaks: Vec<MenuId>,
}

impl MenuForest {
    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(TreeNode::size).sum()
    }

    /// True when assembly had to promote records to keep the forest valid.
    pub fn is_degraded(&self) -> bool {
        !self.orphans.is_empty() || !self.cycle_breaks.is_empty()
    }

    /// Pre-order walk over every node.
    pub fn iter(&self) -> impl Iterator<Item = &TreeNode> {
        let mut stack: Vec<&TreeNode> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    pub fn find(&self, id: MenuId) -> Option<&TreeNode> {
        self.iter().find(|tree| tree.id() == id)
    }

    /// Id of the root each node hangs under.
    pub fn module_of(&self) -> HashMap<MenuId, MenuId> {
        let mut modules = HashMap::with_capacity(self.node_count());
        for root in &self.roots {
            let mut stack = vec![root];
            while let Some(tree) = stack.pop() {
                modules.insert(tree.id(), root.id());
                stack.extend(tree.children.iter());
            }
        }
        modules
    }
}

/// Assembles flat records into a forest.
///
/// Children keep the order storage supplied them in, unless any sibling in a
/// group carries a `sort_order`; that group is then sorted ascending by
/// `sort_order` with ties broken by id, and keyless siblings go last.
pub fn assemble(flat: Vec<MenuNode>) -> MenuForest {
    let count = flat.len();

    let mut position: HashMap<MenuId, usize> = HashMap::with_capacity(count);
    for (idx, node) in flat.iter().enumerate() {
        position.entry(node.id).or_insert(idx);
    }

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut roots = Vec::new();
    let mut orphans = Vec::new();
    let mut cycle_breaks = Vec::new();

    for (idx, node) in flat.iter().enumerate() {
        match node.parent_id {
            None => roots.push(idx),
            Some(parent_id) => match position.get(&parent_id) {
                Some(&parent) if parent != idx => children[parent].push(idx),
                Some(_) => {
                    cycle_breaks.push(node.id);
                    roots.push(idx);
                }
                None => {
                    orphans.push(node.id);
                    roots.push(idx);
                }
            },
        }
    }

    // Anything not reachable from a root hangs off a stored loop. Climb to
    // the loop and cut it at its first member in input order, so nodes merely
    // hanging below the loop keep their parent.
    let mut visited = vec![false; count];
    mark_reachable(&roots, &children, &mut visited);
    for idx in 0..count {
        if visited[idx] {
            continue;
        }
        let cut = loop_entry(idx, &flat, &position);
        if let Some(&parent) = flat[cut].parent_id.as_ref().and_then(|p| position.get(p)) {
            children[parent].retain(|&child| child != cut);
        }
        cycle_breaks.push(flat[cut].id);
        roots.push(cut);
        mark_reachable(&[cut], &children, &mut visited);
    }

    order_siblings(&mut roots, &flat);
    for group in children.iter_mut() {
        order_siblings(group, &flat);
    }

    let mut slots: Vec<Option<MenuNode>> = flat.into_iter().map(Some).collect();
    let roots = roots
        .into_iter()
        .filter_map(|idx| build(idx, &mut slots, &children))
        .collect();

    MenuForest {
        roots,
        orphans,
        cycle_breaks,
    }
}

/// Follows parent links up from `start` until a record repeats and returns
/// the earliest input position on the loop that was found.
fn loop_entry(start: usize, flat: &[MenuNode], position: &HashMap<MenuId, usize>) -> usize {
    let mut path: Vec<usize> = Vec::new();
    let mut current = start;
    loop {
        if let Some(at) = path.iter().position(|&idx| idx == current) {
            return path[at..].iter().copied().min().unwrap_or(current);
        }
        path.push(current);
        match flat[current].parent_id.as_ref().and_then(|p| position.get(p)) {
            Some(&parent) => current = parent,
            None => return current,
        }
    }
}

fn mark_reachable(start: &[usize], children: &[Vec<usize>], visited: &mut [bool]) {
    let mut stack: Vec<usize> = start.to_vec();
    while let Some(idx) = stack.pop() {
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        stack.extend(children[idx].iter().copied());
    }
}

fn order_siblings(group: &mut [usize], flat: &[MenuNode]) {
    if !group.iter().any(|&idx| flat[idx].sort_order.is_some()) {
        return;
    }
    group.sort_by_key(|&idx| {
        let node = &flat[idx];
        let key = match node.sort_order {
            Some(order) => (0u8, order),
            None => (1u8, 0),
        };
        (key, node.id)
    });
}

fn build(idx: usize, slots: &mut [Option<MenuNode>], children: &[Vec<usize>]) -> Option<TreeNode> {
    let node = slots[idx].take()?;
    let children = children[idx]
        .iter()
        .filter_map(|&child| build(child, slots, children))
        .collect();
    Some(TreeNode { node, children })
}
