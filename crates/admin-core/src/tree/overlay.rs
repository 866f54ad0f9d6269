// ============================================================================
// Admin Core - Permission Selection Overlay
// File: crates/admin-core/src/tree/overlay.rs
// Description: Tri-state checkbox state from a role's granted menu ids
// ============================================================================

use std::collections::BTreeSet;

use serde::Serialize;

use super::assembler::{MenuForest, TreeNode};
use crate::domain::{MenuId, MenuNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CheckState {
    pub checked: bool,
    /// Not checked itself, but some strict descendant is.
    pub indeterminate: bool,
}

impl CheckState {
    /// Checked or indeterminate.
    pub fn is_touched(self) -> bool {
        self.checked || self.indeterminate
    }
}

/// Borrowed view of a tree node with its check state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckedNode<'a> {
    pub node: &'a MenuNode,
    pub state: CheckState,
    pub children: Vec<CheckedNode<'a>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CheckedForest<'a> {
    pub roots: Vec<CheckedNode<'a>>,
}

impl<'a> CheckedForest<'a> {
    /// Pre-order walk over every annotated node.
    pub fn iter(&self) -> impl Iterator<Item = &CheckedNode<'a>> {
        let mut stack: Vec<&CheckedNode<'a>> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let next = stack.pop()?;
            stack.extend(next.children.iter().rev());
            Some(next)
        })
    }

    pub fn checked_ids(&self) -> Vec<MenuId> {
        self.iter()
            .filter(|n| n.state.checked)
            .map(|n| n.node.id)
            .collect()
    }

    /// Half-checked ids, in pre-order.
    pub fn indeterminate_ids(&self) -> Vec<MenuId> {
        self.iter()
            .filter(|n| n.state.indeterminate)
            .map(|n| n.node.id)
            .collect()
    }
}

/// Marks each node checked iff its id is selected, and indeterminate iff it
/// is unchecked with a checked strict descendant. Checked never propagates
/// downward. One post-order pass.
pub fn apply_selection<'a>(forest: &'a MenuForest, selected: &BTreeSet<MenuId>) -> CheckedForest<'a> {
    CheckedForest {
        roots: forest
            .roots
            .iter()
            .map(|root| annotate(root, selected).0)
            .collect(),
    }
}

/// Returns the annotated node and whether anything in its subtree is checked.
fn annotate<'a>(tree: &'a TreeNode, selected: &BTreeSet<MenuId>) -> (CheckedNode<'a>, bool) {
    let mut below_checked = false;
    let children = tree
        .children
        .iter()
        .map(|child| {
            let (annotated, subtree_checked) = annotate(child, selected);
            below_checked |= subtree_checked;
            annotated
        })
        .collect();

    let checked = selected.contains(&tree.node.id);
    let state = CheckState {
        checked,
        indeterminate: !checked && below_checked,
    };

    (
        CheckedNode {
            node: &tree.node,
            state,
            children,
        },
        checked || below_checked,
    )
}

/// Keeps only checked or indeterminate nodes: the menu a role can reach.
pub fn prune_to_granted(forest: CheckedForest<'_>) -> CheckedForest<'_> {
    CheckedForest {
        roots: prune(forest.roots),
    }
}

fn prune(nodes: Vec<CheckedNode<'_>>) -> Vec<CheckedNode<'_>> {
    nodes
        .into_iter()
        .filter(|n| n.state.is_touched())
        .map(|n| CheckedNode {
            children: prune(n.children),
            ..n
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MenuType, NewMenuNode};
    use crate::tree::assembler::assemble;

    fn node(id: i64, parent: Option<i64>) -> MenuNode {
        MenuNode::from_new(
            MenuId(id),
            NewMenuNode {
                parent_id: parent.map(MenuId),
                ..NewMenuNode::new(format!("n{}", id), MenuType::Catalog)
            },
        )
    }

    fn selection(ids: &[i64]) -> BTreeSet<MenuId> {
        ids.iter().copied().map(MenuId).collect()
    }

    fn state_of(forest: &CheckedForest<'_>, id: i64) -> CheckState {
        forest
            .iter()
            .find(|n| n.node.id == MenuId(id))
            .map(|n| n.state)
            .unwrap()
    }

    // A(1) -> B(2) -> C(3)
    fn chain() -> MenuForest {
        assemble(vec![node(1, None), node(2, Some(1)), node(3, Some(2))])
    }

    #[test]
    fn test_leaf_selection_marks_ancestors_indeterminate() {
        let forest = chain();
        let checked = apply_selection(&forest, &selection(&[3]));

        let a = state_of(&checked, 1);
        let b = state_of(&checked, 2);
        let c = state_of(&checked, 3);
        assert!(a.indeterminate && !a.checked);
        assert!(b.indeterminate && !b.checked);
        assert!(c.checked && !c.indeterminate);
    }

    #[test]
    fn test_root_selection_does_not_cascade_down() {
        let forest = chain();
        let checked = apply_selection(&forest, &selection(&[1]));

        assert_eq!(
            state_of(&checked, 1),
            CheckState {
                checked: true,
                indeterminate: false
            }
        );
        assert_eq!(state_of(&checked, 2), CheckState::default());
        assert_eq!(state_of(&checked, 3), CheckState::default());
    }

    #[test]
    fn test_checked_parent_with_checked_child_is_not_indeterminate() {
        let forest = chain();
        let checked = apply_selection(&forest, &selection(&[1, 3]));

        assert!(state_of(&checked, 1).checked);
        assert!(!state_of(&checked, 1).indeterminate);
        assert!(state_of(&checked, 2).indeterminate);
    }

    #[test]
    fn test_sibling_branches_are_independent() {
        let forest = assemble(vec![
            node(1, None),
            node(2, Some(1)),
            node(3, Some(1)),
            node(4, Some(3)),
            node(5, None),
        ]);
        let checked = apply_selection(&forest, &selection(&[2]));

        assert!(state_of(&checked, 1).indeterminate);
        assert_eq!(state_of(&checked, 3), CheckState::default());
        assert_eq!(state_of(&checked, 4), CheckState::default());
        assert_eq!(state_of(&checked, 5), CheckState::default());
        assert_eq!(checked.checked_ids(), vec![MenuId(2)]);
        assert_eq!(checked.indeterminate_ids(), vec![MenuId(1)]);
    }

    #[test]
    fn test_unknown_selected_ids_are_ignored() {
        let forest = chain();
        let checked = apply_selection(&forest, &selection(&[99]));
        assert!(checked.iter().all(|n| !n.state.is_touched()));
    }

    #[test]
    fn test_prune_keeps_granted_paths_only() {
        let forest = assemble(vec![
            node(1, None),
            node(2, Some(1)),
            node(3, Some(1)),
            node(4, None),
        ]);
        let pruned = prune_to_granted(apply_selection(&forest, &selection(&[3])));

        let ids: Vec<MenuId> = pruned.iter().map(|n| n.node.id).collect();
        assert_eq!(ids, vec![MenuId(1), MenuId(3)]);
    }
}
