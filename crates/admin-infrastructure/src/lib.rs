//! # Admin Infrastructure
//!
//! PostgreSQL and in-memory menu storage (adjacency list and closure table),
//! role grants, and the composition root.

pub mod bootstrap;
pub mod database;
pub mod memory;

pub use bootstrap::{bootstrap, in_memory, AdminRuntime, BootstrapError};
pub use database::{create_pool, run_migrations, PgMenuRepository, PgPermissionRepository};
pub use memory::{InMemoryMenuRepository, InMemoryPermissionRepository};
