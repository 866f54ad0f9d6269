//! Domain errors

use std::fmt;

use admin_shared::CodeScope;
use serde::Serialize;
use thiserror::Error;

use crate::domain::MenuId;

/// One failing input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {}", join_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("Menu not found: {0}")]
    MenuNotFound(MenuId),

    #[error("Moving menu {node} under {parent} would make it its own ancestor")]
    Cycle { node: MenuId, parent: MenuId },

    #[error("Menu {id} has {children} child menu(s)")]
    HasChildren { id: MenuId, children: usize },

    #[error("Menu code already exists in {scope} scope: {code}")]
    DuplicateCode { code: String, scope: CodeScope },

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    pub fn field(field: &'static str, code: &'static str, message: impl Into<String>) -> Self {
        Self::Validation(vec![FieldError::new(field, code, message)])
    }

    pub fn parent_not_found(parent: MenuId) -> Self {
        Self::field(
            "parent_id",
            "parent_not_found",
            format!("parent menu {} does not exist", parent),
        )
    }

    /// Stable code a request boundary can map to a response.
    pub const fn error_code(&self) -> &'static str {
        match self {
            DomainError::Validation(_) => "VALIDATION_ERROR",
            DomainError::MenuNotFound(_) => "NOT_FOUND",
            DomainError::Cycle { .. } => "CYCLE_ERROR",
            DomainError::HasChildren { .. } => "HAS_CHILDREN",
            DomainError::DuplicateCode { .. } => "DUPLICATE_CODE",
            DomainError::DatabaseError(_) => "DATABASE_ERROR",
            DomainError::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            DomainError::Validation(errors) => errors,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_lists_every_field() {
        let err = DomainError::Validation(vec![
            FieldError::new("label", "required", "label is required"),
            FieldError::new("path", "too_long", "path is too long"),
        ]);

        assert_eq!(
            err.to_string(),
            "Validation error: label: label is required; path: path is too long"
        );
        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert_eq!(err.field_errors().len(), 2);
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let codes = [
            DomainError::parent_not_found(MenuId(1)).error_code(),
            DomainError::MenuNotFound(MenuId(1)).error_code(),
            DomainError::Cycle {
                node: MenuId(1),
                parent: MenuId(2),
            }
            .error_code(),
            DomainError::HasChildren {
                id: MenuId(1),
                children: 2,
            }
            .error_code(),
        ];
        let unique: std::collections::HashSet<_> = codes.iter().collect();
        assert_eq!(unique.len(), codes.len());
    }
}
