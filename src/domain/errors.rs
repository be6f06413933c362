//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound,
    /// Validation error with message
    Validation(String),
    /// Delete blocked by a referencing record
    ReferentialIntegrity(String),
    /// A read-then-write sequence could not be applied atomically; safe to retry
    Consistency(String),
    /// Database/persistence error
    Database(String),
    /// Generic internal error
    Internal(String),
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound => write!(f, "Resource not found"),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::ReferentialIntegrity(msg) => {
                write!(f, "Referential integrity error: {}", msg)
            }
            DomainError::Consistency(msg) => write!(f, "Consistency error: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure and service layers).
// SQLite reports lock contention as a busy/locked execution error; surface it
// as Consistency so callers know the write may be retried.
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        let msg = e.to_string();
        if msg.contains("database is locked") || msg.contains("database table is locked") {
            DomainError::Consistency(msg)
        } else {
            DomainError::Database(msg)
        }
    }
}
