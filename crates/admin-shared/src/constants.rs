//! Application-wide constants

pub const DEFAULT_APP_NAME: &str = "menu-admin";
pub const DEFAULT_LOG_FILTER: &str = "info";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 3;

pub const MAX_LABEL_LENGTH: usize = 100;
pub const MAX_PATH_LENGTH: usize = 255;
pub const MAX_COMPONENT_LENGTH: usize = 255;
pub const MAX_ICON_LENGTH: usize = 100;
pub const MAX_CODE_LENGTH: usize = 100;
