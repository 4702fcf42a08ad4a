//! Error types for mcp-catalog-server.
//!
//! Configuration errors are fatal at startup. Handler errors are reported to
//! the client as JSON-RPC error responses and never end the session.

use std::path::PathBuf;

use serde_json::{json, Value};
use thiserror::Error;

use crate::mcp::protocol::{ErrorCode, JsonRpcErrorData, PROTOCOL_VERSION};

/// Errors that can occur during configuration operations.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("failed to read configuration file: {path}")]
    ReadError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be parsed.
    #[error("failed to parse configuration file: {path}")]
    ParseError {
        /// Path to the configuration file.
        path: PathBuf,
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {path}")]
    NotFound {
        /// Path where the configuration file was expected.
        path: PathBuf,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ValidationError {
        /// Description of the validation failure.
        message: String,
    },
}

/// Failure reported by a tool handler.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ToolError {
    message: String,
}

impl ToolError {
    /// Creates a tool error with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Errors raised by the resource-fetch collaborator.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The HTTP request failed or returned a non-success status.
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    /// Any other fetch failure (used by alternative fetchers).
    #[error("{0}")]
    Other(String),
}

/// Application-level failures of a capability handler.
///
/// Every variant maps onto a JSON-RPC error code through [`HandlerError::code`].
#[derive(Error, Debug)]
pub enum HandlerError {
    /// `initialize` requested a protocol version other than [`PROTOCOL_VERSION`].
    #[error("Protocol version not supported")]
    UnsupportedProtocolVersion {
        /// The version the client asked for, if any.
        requested: Option<String>,
    },

    /// `initialize` received after the handshake already completed.
    #[error("Session already initialised")]
    AlreadyInitialised,

    /// A lifecycle method that needs a completed handshake arrived too early.
    #[error("Session not initialised")]
    NotInitialised,

    /// Request parameters are missing or have the wrong shape.
    #[error("Invalid params: {0}")]
    InvalidParams(String),

    /// `tools/call` named a tool that is not in the catalog.
    #[error("Tool not found")]
    ToolNotFound(String),

    /// `prompts/get` named a prompt that is not in the catalog.
    #[error("Prompt not found")]
    PromptNotFound(String),

    /// `resources/read` named a URI that is not in the catalog.
    #[error("Resource not found")]
    ResourceNotFound(String),

    /// The tool handler itself failed.
    #[error("Tool execution failed: {0}")]
    ToolFailed(#[from] ToolError),

    /// The remote resource could not be fetched.
    #[error("Failed to fetch resource: {0}")]
    Fetch(#[from] FetchError),

    /// A result could not be converted to JSON.
    #[error("Internal error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl HandlerError {
    /// Returns the JSON-RPC error code reported for this failure.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnsupportedProtocolVersion { .. }
            | Self::AlreadyInitialised
            | Self::NotInitialised => ErrorCode::InvalidRequest,
            Self::InvalidParams(_)
            | Self::ToolNotFound(_)
            | Self::PromptNotFound(_)
            | Self::ResourceNotFound(_) => ErrorCode::InvalidParams,
            Self::ToolFailed(_) | Self::Fetch(_) | Self::Serialization(_) => {
                ErrorCode::InternalError
            }
        }
    }

    /// Returns structured detail attached to the error response, if any.
    #[must_use]
    pub fn data(&self) -> Option<Value> {
        match self {
            Self::UnsupportedProtocolVersion { requested } => Some(json!({
                "requested": requested,
                "supported": PROTOCOL_VERSION,
            })),
            Self::ToolNotFound(name) | Self::PromptNotFound(name) => Some(json!({ "name": name })),
            Self::ResourceNotFound(uri) => Some(json!({ "uri": uri })),
            _ => None,
        }
    }

    /// Converts this failure into the error object of a response.
    #[must_use]
    pub fn to_error_data(&self) -> JsonRpcErrorData {
        let error = JsonRpcErrorData::with_message(self.code(), self.to_string());
        match self.data() {
            Some(data) => error.with_data(data),
            None => error,
        }
    }
}
