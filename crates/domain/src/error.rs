//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`TelemetryError`] at port boundaries.

/// Error type returned across port boundaries.
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// A payload could not be decoded into a reading.
    #[error("decode error")]
    Decode(#[from] DecodeError),

    /// The relational store rejected an operation.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The publish/subscribe broker rejected an operation.
    #[error("broker error")]
    Broker(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Why a raw payload could not be decoded into a reading.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The payload is not valid JSON, or a field has the wrong type.
    #[error("malformed payload")]
    Malformed(#[source] serde_json::Error),

    /// The payload is valid JSON but not an object.
    #[error("expected a JSON object, found {found}")]
    NotAnObject {
        /// JSON type of the top-level value.
        found: &'static str,
    },
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err)
    }
}
