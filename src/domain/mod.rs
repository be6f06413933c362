//! Domain layer - Business rules and contracts
//!
//! Framework-agnostic types shared by the service and infrastructure layers.

pub mod errors;
pub mod repositories;

pub use errors::DomainError;
pub use repositories::*;
