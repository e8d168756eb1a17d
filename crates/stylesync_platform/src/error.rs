//! Transport and protocol error types

use thiserror::Error;

/// Transport-related errors
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The handler is already attached to a transport
    #[error("Already attached to a transport")]
    AlreadyStarted,

    /// Posting a message to the host failed
    #[error("Failed to post message: {0}")]
    PostFailed(String),

    /// WebView operation failed
    #[error("WebView operation failed: {0}")]
    WebViewOperation(String),

    /// Inbound or outbound message could not be coded
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// Generic transport error
    #[error("Transport error: {0}")]
    Other(String),
}

/// Message decoding errors
#[derive(Error, Debug)]
pub enum ProtocolError {
    /// Payload text was not valid JSON, or JSON of the wrong shape
    #[error("Invalid JSON for '{kind}': {source}")]
    InvalidJson {
        /// Message kind the payload belonged to
        kind: String,
        /// Underlying parser error
        #[source]
        source: serde_json::Error,
    },

    /// Payload was valid JSON but not the expected type
    #[error("Unexpected payload for '{kind}': expected {expected}")]
    UnexpectedPayload {
        /// Message kind the payload belonged to
        kind: String,
        /// Short description of what was expected
        expected: &'static str,
    },
}

impl ProtocolError {
    pub(crate) fn invalid_json(kind: &str, source: serde_json::Error) -> Self {
        Self::InvalidJson {
            kind: kind.to_string(),
            source,
        }
    }

    pub(crate) fn unexpected(kind: &str, expected: &'static str) -> Self {
        Self::UnexpectedPayload {
            kind: kind.to_string(),
            expected,
        }
    }
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, BridgeError>;
