//! # Admin Core - Domain Module
//!
//! Domain entities for the menu tree.

pub mod menu;
pub mod permission;

pub use menu::{MenuId, MenuNode, MenuPatch, MenuType, NewMenuNode};
pub use permission::{PermissionAssignment, RoleId};
