// ============================================================================
// Admin Infrastructure - Composition Root
// File: crates/admin-infrastructure/src/bootstrap.rs
// Description: Builds repositories and the menu tree service from config
// ============================================================================

use std::sync::Arc;

use sqlx::migrate::MigrateError;
use sqlx::PgPool;
use thiserror::Error;
use tracing::info;

use admin_core::error::DomainError;
use admin_core::repositories::{MenuRepository, PermissionRepository};
use admin_core::services::{DynMenuTreeService, MenuTreeService};
use admin_shared::config::AppConfig;
use admin_shared::{StorageBackend, TreeStrategy};

use crate::database::{create_pool, run_migrations, PgMenuRepository, PgPermissionRepository};
use crate::memory::{InMemoryMenuRepository, InMemoryPermissionRepository};

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Database connection failed: {0}")]
    Connect(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migrate(#[from] MigrateError),

    #[error("Operation needs postgres storage: {0}")]
    Unsupported(&'static str),

    #[error(transparent)]
    Domain(#[from] DomainError),
}

/// Wired-up service plus the handles maintenance commands need.
pub struct AdminRuntime {
    pub service: Arc<DynMenuTreeService>,
    pub strategy: TreeStrategy,
    pool: Option<PgPool>,
    pg_menus: Option<Arc<PgMenuRepository>>,
}

impl AdminRuntime {
    pub fn storage(&self) -> StorageBackend {
        if self.pool.is_some() {
            StorageBackend::Postgres
        } else {
            StorageBackend::Memory
        }
    }

    pub async fn migrate(&self) -> Result<(), BootstrapError> {
        let pool = self
            .pool
            .as_ref()
            .ok_or(BootstrapError::Unsupported("migrate"))?;
        run_migrations(pool).await?;
        Ok(())
    }

    pub async fn rebuild_closure(&self) -> Result<u64, BootstrapError> {
        let menus = self
            .pg_menus
            .as_ref()
            .ok_or(BootstrapError::Unsupported("reindex"))?;
        Ok(menus.rebuild_closure().await?)
    }
}

pub async fn bootstrap(config: &AppConfig) -> Result<AdminRuntime, BootstrapError> {
    let strategy = config.menu.strategy;
    let code_scope = config.menu.code_scope;

    match config.menu.storage {
        StorageBackend::Postgres => {
            let pool = create_pool(&config.database).await?;
            info!(
                "Connected to PostgreSQL (max {} connections)",
                config.database.max_connections
            );

            let pg_menus = Arc::new(PgMenuRepository::new(pool.clone(), strategy));
            let menus: Arc<dyn MenuRepository> = pg_menus.clone();
            let permissions: Arc<dyn PermissionRepository> =
                Arc::new(PgPermissionRepository::new(pool.clone()));

            Ok(AdminRuntime {
                service: Arc::new(MenuTreeService::new(menus, permissions, code_scope)),
                strategy,
                pool: Some(pool),
                pg_menus: Some(pg_menus),
            })
        }
        StorageBackend::Memory => {
            info!("Using in-memory menu storage ({:?})", strategy);
            Ok(in_memory(strategy, code_scope))
        }
    }
}

/// Process-local runtime; nothing survives the process.
pub fn in_memory(strategy: TreeStrategy, code_scope: admin_shared::CodeScope) -> AdminRuntime {
    let menus: Arc<dyn MenuRepository> = Arc::new(InMemoryMenuRepository::new(strategy));
    let permissions: Arc<dyn PermissionRepository> = Arc::new(InMemoryPermissionRepository::new());

    AdminRuntime {
        service: Arc::new(MenuTreeService::new(menus, permissions, code_scope)),
        strategy,
        pool: None,
        pg_menus: None,
    }
}
