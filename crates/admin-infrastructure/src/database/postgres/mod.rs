//! PostgreSQL repository implementations

mod adjacency;
mod closure;
mod menu_rows;

pub mod menu_repo_impl;
pub mod permission_repo_impl;

pub use menu_repo_impl::PgMenuRepository;
pub use permission_repo_impl::PgPermissionRepository;
