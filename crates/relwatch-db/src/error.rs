//! Persistence errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(String),
}
