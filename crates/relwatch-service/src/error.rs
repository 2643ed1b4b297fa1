//! Service errors.

use thiserror::Error;

use relwatch_lookup::LookupError;
use relwatch_status::DispatchError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("Cannot build service '{id}': {message}")]
    Build { id: String, message: String },
}

impl ServiceError {
    pub fn build(id: &str, message: impl Into<String>) -> Self {
        Self::Build {
            id: id.to_string(),
            message: message.into(),
        }
    }
}
