//! Configuration management

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::constants::{
    DEFAULT_ACQUIRE_TIMEOUT_SECS, DEFAULT_APP_NAME, DEFAULT_MAX_CONNECTIONS,
    DEFAULT_MIN_CONNECTIONS,
};
use crate::error::AppError;
use crate::types::{CodeScope, LogFormat, StorageBackend, TreeStrategy};

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseSettings,
    pub menu: MenuSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppSettings {
    pub env: String,
    pub name: String,
    pub log_format: LogFormat,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct MenuSettings {
    pub storage: StorageBackend,
    pub strategy: TreeStrategy,
    pub code_scope: CodeScope,
}

impl AppConfig {
    pub fn load() -> Result<Self, AppError> {
        let env = std::env::var("APP_ENV").unwrap_or_else(|_| "development".into());
        let builder = Self::defaults()?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(Environment::default().separator("__").try_parsing(true));
        Ok(builder.build()?.try_deserialize()?)
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        Config::builder()
            .set_default("app.env", "development")?
            .set_default("app.name", DEFAULT_APP_NAME)?
            .set_default("app.log_format", "json")?
            .set_default("database.url", "postgres://localhost/menu_admin")?
            .set_default("database.max_connections", i64::from(DEFAULT_MAX_CONNECTIONS))?
            .set_default("database.min_connections", i64::from(DEFAULT_MIN_CONNECTIONS))?
            .set_default("database.acquire_timeout_secs", DEFAULT_ACQUIRE_TIMEOUT_SECS as i64)?
            .set_default("menu.storage", "postgres")?
            .set_default("menu.strategy", "adjacency")?
            .set_default("menu.code_scope", "global")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_deserialize() {
        let config: AppConfig = AppConfig::defaults()
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.app.name, "menu-admin");
        assert_eq!(config.app.log_format, LogFormat::Json);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.menu.storage, StorageBackend::Postgres);
        assert_eq!(config.menu.strategy, TreeStrategy::Adjacency);
        assert_eq!(config.menu.code_scope, CodeScope::Global);
    }

    #[test]
    fn test_overrides_select_closure_strategy() {
        let config: AppConfig = AppConfig::defaults()
            .unwrap()
            .set_override("menu.strategy", "closure")
            .unwrap()
            .set_override("menu.storage", "memory")
            .unwrap()
            .set_override("menu.code_scope", "siblings")
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.menu.strategy, TreeStrategy::Closure);
        assert_eq!(config.menu.storage, StorageBackend::Memory);
        assert_eq!(config.menu.code_scope, CodeScope::Siblings);
    }
}
