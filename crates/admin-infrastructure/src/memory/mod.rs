//! In-process adapters, for tests and throwaway runs

pub mod closure_index;
pub mod menu_store;
pub mod permission_store;

pub use closure_index::ClosureIndex;
pub use menu_store::InMemoryMenuRepository;
pub use permission_store::InMemoryPermissionRepository;
