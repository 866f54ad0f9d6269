//! # Admin Core
//!
//! Menu domain model, tree pipeline, repository ports, and services for the
//! admin menu and permission tree.

pub mod domain;
pub mod error;
pub mod repositories;
pub mod services;
pub mod tree;
pub mod validation;

// Re-export domain entities
pub use domain::*;
pub use error::{DomainError, FieldError};
