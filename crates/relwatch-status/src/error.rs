//! Dispatch errors.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// The consumer of a sink has gone away.
    #[error("The {0} sink is closed")]
    SinkClosed(&'static str),
}
