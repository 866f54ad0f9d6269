//! # Admin Shared
//! 
//! Shared configuration, telemetry, and types for the menu admin workspace.

pub mod constants;
pub mod types;
pub mod telemetry;
pub mod config;
pub mod error;

pub use types::*;
pub use error::AppError;
