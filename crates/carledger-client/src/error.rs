//! Error types for carledger-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Client configuration error: {reason}")]
    Config { reason: String },

    #[error("{operation}: request failed: {reason}")]
    Transport { operation: String, reason: String },

    #[error("{operation}: no response within {timeout_ms} ms")]
    Timeout { operation: String, timeout_ms: u128 },

    #[error("{operation}: HTTP {status}: {body}")]
    Status { operation: String, status: u16, body: String },

    #[error("{operation}: unexpected response body: {reason}")]
    Decode { operation: String, reason: String },
}

pub type ClientResult<T> = Result<T, ClientError>;
