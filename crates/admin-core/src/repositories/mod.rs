//! Repository traits (ports)

pub mod menu_repository;
pub mod permission_repository;

pub use menu_repository::{prepare_create, prepare_update, MenuRepository};
pub use permission_repository::PermissionRepository;

#[cfg(test)]
pub use menu_repository::MockMenuRepository;
#[cfg(test)]
pub use permission_repository::MockPermissionRepository;
