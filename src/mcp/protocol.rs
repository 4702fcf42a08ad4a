//! JSON-RPC 2.0 message codec for the MCP stdio protocol.
//!
//! # Message Types
//!
//! - **Request**: A message expecting a response (has `id`)
//! - **Notification**: A one-way message (no `id`, never answered)
//! - **Response**: Exactly one of `result` or `error`, echoing the request `id`
//!
//! Decoding is deliberately lenient about the envelope: only frames that are
//! not JSON objects, or whose `id`/`method` have the wrong type, are rejected
//! with a parse error. An absent `method` decodes to an empty name so that the
//! dispatcher reports it as an unknown method.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

/// The MCP protocol version this implementation supports.
///
/// Clients must request exactly this version during `initialize`.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Default server name for capability negotiation.
pub const SERVER_NAME: &str = "mcp-catalog-server";

/// A JSON-RPC 2.0 request ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric request ID, echoed with its JSON representation.
    Number(Number),
    /// String request ID.
    String(String),
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

/// A decoded JSON-RPC request or notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcRequest {
    /// Request identifier; `None` marks a notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,

    /// The method to invoke.
    pub method: String,

    /// Optional parameters for the method.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    /// Returns `true` if no response may be sent for this message.
    #[must_use]
    pub const fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// Standard JSON-RPC 2.0 error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid JSON was received by the server.
    ParseError,
    /// The JSON sent is not a valid Request object.
    InvalidRequest,
    /// The method does not exist or is not available.
    MethodNotFound,
    /// Invalid method parameters.
    InvalidParams,
    /// Internal JSON-RPC error.
    InternalError,
}

impl ErrorCode {
    /// Returns the numeric code for this error.
    #[must_use]
    pub const fn code(self) -> i32 {
        match self {
            Self::ParseError => -32700,
            Self::InvalidRequest => -32600,
            Self::MethodNotFound => -32601,
            Self::InvalidParams => -32602,
            Self::InternalError => -32603,
        }
    }

    /// Returns the default message for this error code.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::ParseError => "Parse error",
            Self::InvalidRequest => "Invalid Request",
            Self::MethodNotFound => "Method not found",
            Self::InvalidParams => "Invalid params",
            Self::InternalError => "Internal error",
        }
    }
}

/// A JSON-RPC 2.0 error object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcErrorData {
    /// The error code.
    pub code: i32,

    /// A short description of the error.
    pub message: String,

    /// Additional information about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcErrorData {
    /// Creates a new error from an error code.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self::with_message(code, code.default_message())
    }

    /// Creates a new error with a custom message.
    #[must_use]
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.code(),
            message: message.into(),
            data: None,
        }
    }

    /// Adds additional data to the error.
    #[must_use]
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// The payload of a response: exactly one of `result` or `error`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// Successful result; may be `null`.
    Result(Value),
    /// Failure details.
    Error(JsonRpcErrorData),
}

/// A JSON-RPC 2.0 response.
///
/// `id` serialises as `null` when the originating request could not be decoded.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonRpcResponse {
    /// Always "2.0".
    pub jsonrpc: &'static str,

    /// The request ID this response corresponds to.
    pub id: Option<RequestId>,

    /// Result or error.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl JsonRpcResponse {
    /// Returns `true` if this response carries an error.
    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    /// Returns the error object, if any.
    #[must_use]
    pub const fn error(&self) -> Option<&JsonRpcErrorData> {
        match &self.outcome {
            Outcome::Error(error) => Some(error),
            Outcome::Result(_) => None,
        }
    }

    /// Returns the result value, if any.
    #[must_use]
    pub const fn result(&self) -> Option<&Value> {
        match &self.outcome {
            Outcome::Result(result) => Some(result),
            Outcome::Error(_) => None,
        }
    }
}

/// A frame that is not a well-formed request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{details}")]
pub struct ParseError {
    details: String,
}

impl ParseError {
    fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }

    /// Converts the failure into the `-32700` response with a `null` id.
    #[must_use]
    pub fn into_response(self) -> JsonRpcResponse {
        encode_error(
            None,
            JsonRpcErrorData::from_code(ErrorCode::ParseError).with_data(Value::String(self.details)),
        )
    }
}

/// Decodes a single frame into a request.
///
/// # Errors
///
/// Returns a [`ParseError`] if the frame is not a JSON object, or if `id` or
/// `method` have an invalid type.
pub fn decode(frame: &str) -> Result<JsonRpcRequest, ParseError> {
    let value: Value = serde_json::from_str(frame).map_err(|e| ParseError::new(e.to_string()))?;

    let Value::Object(mut obj) = value else {
        return Err(ParseError::new("message must be a JSON object"));
    };

    if let Some(version) = obj.get("jsonrpc") {
        if version.as_str() != Some("2.0") {
            tracing::debug!(jsonrpc = %version, "Unexpected jsonrpc version field");
        }
    }

    let id = match obj.remove("id") {
        None | Some(Value::Null) => None,
        Some(raw) => Some(
            serde_json::from_value::<RequestId>(raw)
                .map_err(|_| ParseError::new("id must be a string or a number"))?,
        ),
    };

    let method = match obj.remove("method") {
        None => String::new(),
        Some(Value::String(method)) => method,
        Some(_) => return Err(ParseError::new("method must be a string")),
    };

    let params = obj.remove("params").filter(|p| !p.is_null());

    Ok(JsonRpcRequest { id, method, params })
}

/// Wraps `result` (which may be `null`) under the success shape.
#[must_use]
pub const fn encode_result(id: Option<RequestId>, result: Value) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        outcome: Outcome::Result(result),
    }
}

/// Wraps `error` under the error shape.
#[must_use]
pub const fn encode_error(id: Option<RequestId>, error: JsonRpcErrorData) -> JsonRpcResponse {
    JsonRpcResponse {
        jsonrpc: "2.0",
        id,
        outcome: Outcome::Error(error),
    }
}
