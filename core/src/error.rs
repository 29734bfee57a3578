//! Error types for the remote store client.
//!
//! # Design
//! Callers of the store treat every variant as "the remote operation
//! failed". The variants exist so logs can say which step went wrong: the
//! round trip itself, the status the store answered with, or the payload.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never produced a response (connect, DNS, TLS, timeout).
    #[error("transport failed: {0}")]
    Transport(String),

    /// The store answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),
}
