//! Error types for client operations.

use rubber_http::TransportError;
use thiserror::Error;

use crate::config::ConfigError;

/// Error type for everything above the transport.
#[derive(Error, Debug)]
pub enum RubberError {
    /// The request never produced a response. Only surfaced when the
    /// resource was built with `raise_on_error`.
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// A body could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A value offered none of the serialization capabilities.
    #[error("Value of type {0} cannot be serialized as a document body")]
    Unserializable(String),

    /// A record has no field by that name, with or without the `_` prefix.
    #[error("Field not found: {0}")]
    FieldNotFound(String),

    /// A client has no special endpoint by that name.
    #[error("Unknown attribute: {0}")]
    UnknownAttribute(String),

    /// Settings could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl RubberError {
    /// Whether the error came from the transport.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }

    /// Whether the error is a failed name lookup on a record or client.
    pub fn is_lookup(&self) -> bool {
        matches!(self, Self::FieldNotFound(_) | Self::UnknownAttribute(_))
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, RubberError>;
