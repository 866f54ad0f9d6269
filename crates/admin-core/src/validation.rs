// ============================================================================
// Admin Core - Menu Validation
// File: crates/admin-core/src/validation.rs
// Description: Field-level checks for menu create/update input
// ============================================================================
//! Explicit validation for menu input. Every rule runs, so callers get the
//! complete list of failing fields in one response.

use admin_shared::constants::{
    MAX_CODE_LENGTH, MAX_COMPONENT_LENGTH, MAX_ICON_LENGTH, MAX_LABEL_LENGTH, MAX_PATH_LENGTH,
};

use crate::domain::{MenuNode, MenuType, NewMenuNode};
use crate::error::{DomainError, FieldError};

/// Fields shared by create input and a patched record.
struct MenuFields<'a> {
    menu_type: MenuType,
    label: &'a str,
    path: Option<&'a str>,
    component: Option<&'a str>,
    icon: Option<&'a str>,
    code: Option<&'a str>,
    sort_order: Option<i32>,
}

impl<'a> From<&'a NewMenuNode> for MenuFields<'a> {
    fn from(input: &'a NewMenuNode) -> Self {
        Self {
            menu_type: input.menu_type,
            label: &input.label,
            path: input.path.as_deref(),
            component: input.component.as_deref(),
            icon: input.icon.as_deref(),
            code: input.code.as_deref(),
            sort_order: input.sort_order,
        }
    }
}

impl<'a> From<&'a MenuNode> for MenuFields<'a> {
    fn from(node: &'a MenuNode) -> Self {
        Self {
            menu_type: node.menu_type,
            label: &node.label,
            path: node.path.as_deref(),
            component: node.component.as_deref(),
            icon: node.icon.as_deref(),
            code: node.code.as_deref(),
            sort_order: node.sort_order,
        }
    }
}

/// Validates (already normalized) create input.
pub fn validate_new_menu(input: &NewMenuNode) -> Vec<FieldError> {
    validate_fields(MenuFields::from(input))
}

/// Validates a record after a patch has been applied to it.
/// Structural checks (parent exists, no cycle) belong to storage.
pub fn validate_patched_menu(node: &MenuNode) -> Vec<FieldError> {
    validate_fields(MenuFields::from(node))
}

/// Collapses a field error list into a result.
pub fn ensure_valid(errors: Vec<FieldError>) -> Result<(), DomainError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

fn validate_fields(fields: MenuFields<'_>) -> Vec<FieldError> {
    let mut errors = Vec::new();

    if fields.label.trim().is_empty() {
        errors.push(FieldError::new("label", "required", "label is required"));
    } else {
        check_length(&mut errors, "label", fields.label, MAX_LABEL_LENGTH);
    }

    if let Some(path) = fields.path {
        check_length(&mut errors, "path", path, MAX_PATH_LENGTH);
    }
    if let Some(component) = fields.component {
        check_length(&mut errors, "component", component, MAX_COMPONENT_LENGTH);
    }
    if let Some(icon) = fields.icon {
        check_length(&mut errors, "icon", icon, MAX_ICON_LENGTH);
    }
    if let Some(code) = fields.code {
        check_length(&mut errors, "code", code, MAX_CODE_LENGTH);
        if code.chars().any(char::is_whitespace) {
            errors.push(FieldError::new(
                "code",
                "whitespace",
                "code must not contain whitespace",
            ));
        }
    }

    match fields.menu_type {
        MenuType::Menu if fields.path.is_none() => {
            errors.push(FieldError::new(
                "path",
                "required",
                "path is required for menu entries",
            ));
        }
        MenuType::Button if fields.code.is_none() => {
            errors.push(FieldError::new(
                "code",
                "required",
                "code is required for button entries",
            ));
        }
        _ => {}
    }

    if matches!(fields.sort_order, Some(order) if order < 0) {
        errors.push(FieldError::new(
            "sort_order",
            "negative",
            "sort order must not be negative",
        ));
    }

    errors
}

fn check_length(errors: &mut Vec<FieldError>, field: &'static str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.push(FieldError::new(
            field,
            "too_long",
            format!("{} must be at most {} characters (got {})", field, max, len),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MenuId;

    fn menu(label: &str) -> NewMenuNode {
        NewMenuNode {
            path: Some("/dashboard".to_string()),
            ..NewMenuNode::new(label, MenuType::Menu)
        }
    }

    #[test]
    fn test_valid_menu_passes() {
        assert!(validate_new_menu(&menu("Dashboard")).is_empty());
        assert!(ensure_valid(validate_new_menu(&menu("Dashboard"))).is_ok());
    }

    #[test]
    fn test_empty_label_rejected() {
        let errors = validate_new_menu(&menu("   "));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "label");
        assert_eq!(errors[0].code, "required");
    }

    #[test]
    fn test_reports_every_failing_field() {
        let input = NewMenuNode {
            icon: Some("x".repeat(MAX_ICON_LENGTH + 1)),
            code: Some("user add".to_string()),
            sort_order: Some(-1),
            ..NewMenuNode::new("", MenuType::Menu)
        };

        let fields: Vec<_> = validate_new_menu(&input).iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["label", "icon", "code", "path", "sort_order"]);
    }

    #[test]
    fn test_type_specific_requirements() {
        let button = NewMenuNode::new("Add user", MenuType::Button);
        let errors = validate_new_menu(&button);
        assert_eq!(errors.len(), 1);
        assert_eq!((errors[0].field, errors[0].code), ("code", "required"));

        let catalog = NewMenuNode::new("System", MenuType::Catalog);
        assert!(validate_new_menu(&catalog).is_empty());
    }

    #[test]
    fn test_patched_menu_revalidates_type_rules() {
        let node = MenuNode::from_new(MenuId(4), NewMenuNode::new("System", MenuType::Catalog));
        let mut as_menu = node.clone();
        as_menu.menu_type = MenuType::Menu;

        assert!(validate_patched_menu(&node).is_empty());
        let errors = validate_patched_menu(&as_menu);
        assert_eq!(errors.len(), 1);
        assert_eq!((errors[0].field, errors[0].code), ("path", "required"));
    }

    #[test]
    fn test_ensure_valid_wraps_errors() {
        let err = ensure_valid(validate_new_menu(&menu(""))).unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref e) if e.len() == 1));
    }
}
