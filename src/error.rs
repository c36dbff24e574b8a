//! Error types for metric registration and exposition.

use thiserror::Error;

/// Errors raised while registering instruments or running the exposition server.
#[derive(Debug, Error)]
pub enum MetricsError {
    /// An instrument with the same fully-qualified name is already registered.
    #[error("instrument '{name}' is already registered")]
    DuplicateInstrument { name: String },

    /// The underlying registry refused the instrument (invalid name, bad labels, ...).
    #[error("registry rejected instrument: {0}")]
    Registry(#[source] prometheus::Error),

    /// The snapshot could not be encoded in the text exposition format.
    #[error("failed to encode metrics: {0}")]
    Encode(String),

    /// The configured scrape path cannot be routed.
    #[error("invalid metrics path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// The listening socket could not be opened.
    #[error("could not bind metrics server to {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be loaded or parsed.
    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<prometheus::Error> for MetricsError {
    fn from(err: prometheus::Error) -> Self {
        MetricsError::Registry(err)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MetricsError>;
