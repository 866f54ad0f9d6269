//! In-memory closure table: one `(ancestor, descendant) -> depth` entry per
//! ancestor of every node, self rows at depth 0.

use std::collections::{BTreeMap, HashSet};

use admin_core::domain::{MenuId, MenuNode};
use admin_core::tree::invariants::{ancestors, parent_lookup};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClosureIndex {
    rows: BTreeMap<(MenuId, MenuId), u32>,
}

impl ClosureIndex {
    /// Index derived from parent links. Unknown parents end the chain and
    /// loops stop at the first repeat.
    pub fn from_nodes(nodes: &[MenuNode]) -> Self {
        let parents = parent_lookup(nodes);
        let mut rows = BTreeMap::new();
        for node in nodes {
            rows.insert((node.id, node.id), 0);
            let chain = ancestors(&parents, node.id)
                .into_iter()
                .take_while(|id| parents.contains_key(id));
            for (depth, ancestor) in (1u32..).zip(chain) {
                rows.insert((ancestor, node.id), depth);
            }
        }
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn depth(&self, ancestor: MenuId, descendant: MenuId) -> Option<u32> {
        self.rows.get(&(ancestor, descendant)).copied()
    }

    /// Whether `ancestor` is `descendant` or one of its ancestors.
    pub fn contains(&self, ancestor: MenuId, descendant: MenuId) -> bool {
        self.rows.contains_key(&(ancestor, descendant))
    }

    /// Strict descendants, shallowest first.
    pub fn descendants(&self, id: MenuId) -> Vec<MenuId> {
        let mut below: Vec<(u32, MenuId)> = self
            .below(id)
            .filter(|(_, depth)| *depth > 0)
            .map(|(descendant, depth)| (depth, descendant))
            .collect();
        below.sort_unstable();
        below.into_iter().map(|(_, id)| id).collect()
    }

    pub fn link(&mut self, id: MenuId, parent_id: Option<MenuId>) {
        let above: Vec<(MenuId, u32)> = parent_id
            .map(|parent_id| self.above(parent_id).collect())
            .unwrap_or_default();
        for (ancestor, depth) in above {
            self.rows.insert((ancestor, id), depth + 1);
        }
        self.rows.insert((id, id), 0);
    }

    /// Moves the subtree under `id` below `new_parent`.
    pub fn relink(&mut self, id: MenuId, new_parent: Option<MenuId>) {
        let subtree: Vec<(MenuId, u32)> = self.below(id).collect();
        let inside: HashSet<MenuId> = subtree.iter().map(|(member, _)| *member).collect();

        self.rows.retain(|(ancestor, descendant), _| {
            !inside.contains(descendant) || inside.contains(ancestor)
        });

        let Some(parent_id) = new_parent else {
            return;
        };
        let above: Vec<(MenuId, u32)> = self.above(parent_id).collect();
        for (ancestor, up) in &above {
            for (member, down) in &subtree {
                self.rows.insert((*ancestor, *member), up + down + 1);
            }
        }
    }

    pub fn unlink(&mut self, ids: &[MenuId]) {
        let gone: HashSet<MenuId> = ids.iter().copied().collect();
        self.rows
            .retain(|(ancestor, descendant), _| !gone.contains(ancestor) && !gone.contains(descendant));
    }

    /// `(descendant, depth)` for every row under `id`, self row included.
    fn below(&self, id: MenuId) -> impl Iterator<Item = (MenuId, u32)> + '_ {
        self.rows
            .range((id, MenuId(i64::MIN))..=(id, MenuId(i64::MAX)))
            .map(|((_, descendant), depth)| (*descendant, *depth))
    }

    /// `(ancestor, depth)` for every row above `id`, self row included.
    fn above(&self, id: MenuId) -> impl Iterator<Item = (MenuId, u32)> + '_ {
        self.rows
            .iter()
            .filter(move |((_, descendant), _)| *descendant == id)
            .map(|((ancestor, _), depth)| (*ancestor, *depth))
    }
}
