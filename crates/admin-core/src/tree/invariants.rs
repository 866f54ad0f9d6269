// ============================================================================
// Admin Core - Tree Invariants
// File: crates/admin-core/src/tree/invariants.rs
// Description: Parent-link lookups, cycle checks and stored-record audits
// ============================================================================
//! Helpers over flat menu records shared by the service and the stores.
//!
//! [`tree_violations`] audits stored records without repairing them; the
//! assembler applies the matching repairs when it builds a forest.

use std::collections::{HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::domain::{MenuId, MenuNode};

/// Structural problem found in stored menu records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeViolation {
    UnknownParent { node_id: MenuId, parent_id: MenuId },
    SelfParent { node_id: MenuId },
    CycleDetected { node_ids: Vec<MenuId> },
    DuplicateId { node_id: MenuId },
}

impl TreeViolation {
    pub const fn error_code(&self) -> &'static str {
        match self {
            TreeViolation::UnknownParent { .. } => "menu_unknown_parent",
            TreeViolation::SelfParent { .. } => "menu_self_parent",
            TreeViolation::CycleDetected { .. } => "menu_cycle",
            TreeViolation::DuplicateId { .. } => "menu_duplicate_id",
        }
    }
}

pub fn parent_lookup(nodes: &[MenuNode]) -> HashMap<MenuId, Option<MenuId>> {
    nodes.iter().map(|node| (node.id, node.parent_id)).collect()
}

pub fn children_index(nodes: &[MenuNode]) -> HashMap<MenuId, Vec<MenuId>> {
    let mut index: HashMap<MenuId, Vec<MenuId>> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if let Some(parent_id) = node.parent_id {
            index.entry(parent_id).or_default().push(node.id);
        }
    }
    index
}

/// Strict ancestors of `id`, nearest first. Stops if the chain loops.
pub fn ancestors(parents: &HashMap<MenuId, Option<MenuId>>, id: MenuId) -> Vec<MenuId> {
    let mut chain = Vec::new();
    let mut seen = HashSet::from([id]);
    let mut current = parents.get(&id).copied().flatten();
    while let Some(parent_id) = current {
        if !seen.insert(parent_id) {
            break;
        }
        chain.push(parent_id);
        current = parents.get(&parent_id).copied().flatten();
    }
    chain
}

/// Whether hanging `node` under `new_parent` makes `node` its own ancestor.
pub fn would_create_cycle(
    parents: &HashMap<MenuId, Option<MenuId>>,
    node: MenuId,
    new_parent: MenuId,
) -> bool {
    new_parent == node || ancestors(parents, new_parent).contains(&node)
}

/// Strict descendants of `root` in breadth-first order.
pub fn descendants(children: &HashMap<MenuId, Vec<MenuId>>, root: MenuId) -> Vec<MenuId> {
    let mut reachable = HashSet::from([root]);
    let mut ordered = Vec::new();
    let mut queue = VecDeque::from([root]);

    while let Some(node_id) = queue.pop_front() {
        if let Some(kids) = children.get(&node_id) {
            for child in kids {
                if reachable.insert(*child) {
                    ordered.push(*child);
                    queue.push_back(*child);
                }
            }
        }
    }

    ordered
}

pub fn tree_violations(nodes: &[MenuNode]) -> Vec<TreeViolation> {
    let mut violations = Vec::new();
    let mut ids = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(node.id) {
            violations.push(TreeViolation::DuplicateId { node_id: node.id });
        }
    }

    for node in nodes {
        match node.parent_id {
            Some(parent_id) if parent_id == node.id => {
                violations.push(TreeViolation::SelfParent { node_id: node.id });
            }
            Some(parent_id) if !ids.contains(&parent_id) => {
                violations.push(TreeViolation::UnknownParent {
                    node_id: node.id,
                    parent_id,
                });
            }
            _ => {}
        }
    }

    // Walk down from the roots. Whatever is never reached sits on a loop or
    // hangs below one; only the loop members are reported.
    let children = children_index(nodes);
    let mut reached: HashSet<MenuId> = HashSet::with_capacity(nodes.len());
    let mut queue: VecDeque<MenuId> = nodes
        .iter()
        .filter(|node| match node.parent_id {
            None => true,
            Some(parent_id) => !ids.contains(&parent_id),
        })
        .map(|node| node.id)
        .collect();
    while let Some(node_id) = queue.pop_front() {
        if !reached.insert(node_id) {
            continue;
        }
        if let Some(kids) = children.get(&node_id) {
            queue.extend(kids.iter().copied());
        }
    }

    let parents = parent_lookup(nodes);
    for node in nodes {
        if reached.contains(&node.id) {
            continue;
        }
        let mut members = loop_above(&parents, node.id, &mut reached);
        // Single-member loops are self-parents, already reported above.
        if members.len() > 1 {
            members.sort();
            violations.push(TreeViolation::CycleDetected { node_ids: members });
        }
    }

    violations
}

/// Climbs parent links from `start` and returns the loop it runs into, or an
/// empty list when it reaches a record already in `settled`. Every record
/// visited is added to `settled`.
fn loop_above(
    parents: &HashMap<MenuId, Option<MenuId>>,
    start: MenuId,
    settled: &mut HashSet<MenuId>,
) -> Vec<MenuId> {
    let mut path: Vec<MenuId> = Vec::new();
    let mut current = Some(start);
    let mut members = Vec::new();
    while let Some(id) = current {
        if let Some(at) = path.iter().position(|seen| *seen == id) {
            members = path[at..].to_vec();
            break;
        }
        if settled.contains(&id) {
            break;
        }
        path.push(id);
        current = parents.get(&id).copied().flatten();
    }
    settled.extend(path);
    members
}
