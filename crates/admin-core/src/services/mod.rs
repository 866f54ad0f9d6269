//! Domain services (business logic)

pub mod menu_tree_service;

pub use menu_tree_service::{DynMenuTreeService, MenuTreeService};
