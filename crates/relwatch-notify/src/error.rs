//! Send errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SendError {
    /// The request could not be built or sent.
    #[error("Request failed: {0}")]
    Request(String),

    /// The receiver answered with a status we do not accept.
    #[error("Unexpected status {status}{}", wanted(.expected))]
    UnexpectedStatus { status: u16, expected: Option<u16> },

    /// The notification backend refused the message.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid header {0}")]
    InvalidHeader(String),
}

fn wanted(expected: &Option<u16>) -> String {
    expected.map(|c| format!(", wanted {c}")).unwrap_or_default()
}
