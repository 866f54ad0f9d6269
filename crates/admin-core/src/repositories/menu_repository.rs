//! Menu repository trait (port)
//!
//! Tree storage contract shared by the adjacency-list and closure-table
//! adapters. Implementations apply each write atomically: a rejected write
//! leaves storage exactly as it was.

use admin_shared::TreeStrategy;
use async_trait::async_trait;

use crate::domain::{MenuId, MenuNode, MenuPatch, NewMenuNode};
use crate::error::DomainError;
use crate::validation::{ensure_valid, validate_new_menu, validate_patched_menu};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Backing strategy, for diagnostics.
    fn strategy(&self) -> TreeStrategy;

    /// Every stored record, flat, in storage order.
    async fn list_all(&self) -> Result<Vec<MenuNode>, DomainError>;

    async fn find_by_id(&self, id: MenuId) -> Result<Option<MenuNode>, DomainError>;

    /// Strict descendants of `id`. Fails with `MenuNotFound` if `id` is absent.
    async fn descendant_ids(&self, id: MenuId) -> Result<Vec<MenuId>, DomainError>;

    /// Fails with `Validation` on invalid fields or a missing parent.
    async fn create(&self, input: NewMenuNode) -> Result<MenuId, DomainError>;

    /// Fails with `MenuNotFound`, `Cycle`, or `Validation`.
    async fn update(&self, id: MenuId, patch: MenuPatch) -> Result<(), DomainError>;

    /// Returns the removed ids (the node first). Fails with `HasChildren`
    /// when `cascade` is false and the node has children.
    async fn delete(&self, id: MenuId, cascade: bool) -> Result<Vec<MenuId>, DomainError>;
}

/// Normalizes and validates create input before it reaches storage.
pub fn prepare_create(input: NewMenuNode) -> Result<NewMenuNode, DomainError> {
    let input = input.normalized();
    ensure_valid(validate_new_menu(&input))?;
    Ok(input)
}

/// Applies `patch` to `current` and validates the resulting record.
pub fn prepare_update(current: &MenuNode, patch: &MenuPatch) -> Result<MenuNode, DomainError> {
    let next = current.patched(patch);
    ensure_valid(validate_patched_menu(&next))?;
    Ok(next)
}
