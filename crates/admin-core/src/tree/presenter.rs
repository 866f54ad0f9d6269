//! Tree presenter: annotated forest -> UI table rows

use serde::Serialize;

use super::overlay::{CheckedForest, CheckedNode};
use crate::domain::{MenuId, MenuType};

/// Request-scoped UI flags; never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PresentOptions {
    pub editable: bool,
    pub checkable: bool,
}

/// Menu node as consumed by the hierarchical/checkable table component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayNode {
    pub id: MenuId,
    pub parent_id: Option<MenuId>,
    #[serde(rename = "type")]
    pub menu_type: MenuType,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<i32>,
    pub checked: bool,
    pub indeterminate: bool,
    pub editable: bool,
    pub checkable: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DisplayNode>,
}

impl DisplayNode {
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(DisplayNode::size).sum::<usize>()
    }
}

pub fn present(forest: &CheckedForest<'_>, options: PresentOptions) -> Vec<DisplayNode> {
    forest
        .roots
        .iter()
        .map(|root| present_node(root, options))
        .collect()
}

fn present_node(checked: &CheckedNode<'_>, options: PresentOptions) -> DisplayNode {
    let node = checked.node;
    DisplayNode {
        id: node.id,
        parent_id: node.parent_id,
        menu_type: node.menu_type,
        label: node.label.clone(),
        path: node.path.clone(),
        component: node.component.clone(),
        icon: node.icon.clone(),
        code: node.code.clone(),
        sort_order: node.sort_order,
        checked: checked.state.checked,
        indeterminate: checked.state.indeterminate,
        editable: options.editable,
        checkable: options.checkable,
        children: checked
            .children
            .iter()
            .map(|child| present_node(child, options))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use serde_json::json;

    use super::*;
    use crate::domain::{MenuNode, NewMenuNode};
    use crate::tree::assembler::assemble;
    use crate::tree::overlay::apply_selection;

    fn node(id: i64, parent: Option<i64>, order: Option<i32>) -> MenuNode {
        MenuNode {
            sort_order: order,
            ..MenuNode::from_new(
                MenuId(id),
                NewMenuNode {
                    parent_id: parent.map(MenuId),
                    ..NewMenuNode::new(format!("n{}", id), MenuType::Catalog)
                },
            )
        }
    }

    #[test]
    fn test_presents_in_assembler_order_with_flags() {
        let forest = assemble(vec![
            node(1, None, None),
            node(2, Some(1), Some(2)),
            node(3, Some(1), Some(1)),
        ]);
        let selected: BTreeSet<MenuId> = [MenuId(2)].into_iter().collect();
        let checked = apply_selection(&forest, &selected);
        let rows = present(
            &checked,
            PresentOptions {
                editable: true,
                checkable: false,
            },
        );

        assert_eq!(rows.len(), 1);
        let root = &rows[0];
        assert!(root.indeterminate && !root.checked);
        assert!(root.editable && !root.checkable);
        let child_ids: Vec<MenuId> = root.children.iter().map(|c| c.id).collect();
        assert_eq!(child_ids, vec![MenuId(3), MenuId(2)]);
        assert!(root.children[1].checked);
        assert_eq!(root.size(), 3);
    }

    #[test]
    fn test_serializes_camel_case_and_omits_empty_fields() {
        let mut leaf = node(5, Some(4), None);
        leaf.menu_type = MenuType::Button;
        leaf.code = Some("system:menu:add".to_string());
        let forest = assemble(vec![leaf]);
        let checked = apply_selection(&forest, &BTreeSet::new());
        let rows = present(&checked, PresentOptions::default());

        let value = serde_json::to_value(&rows).unwrap();
        assert_eq!(
            value,
            json!([{
                "id": 5,
                "parentId": 4,
                "type": "button",
                "label": "n5",
                "code": "system:menu:add",
                "checked": false,
                "indeterminate": false,
                "editable": false,
                "checkable": false
            }])
        );
    }
}
