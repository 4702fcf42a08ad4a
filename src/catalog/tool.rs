//! Tool catalog entries and their handlers.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ToolError;

/// Executes a tool call.
///
/// The returned text becomes the single text content block of the
/// `tools/call` result.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Runs the tool with the client-supplied arguments (`null` if absent).
    async fn call(&self, arguments: Value) -> Result<String, ToolError>;
}

/// Echoes its input back.
///
/// A string `text` argument is returned as-is; any other arguments are
/// returned as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoTool;

#[async_trait]
impl ToolHandler for EchoTool {
    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        if let Some(text) = arguments.get("text").and_then(Value::as_str) {
            return Ok(text.to_string());
        }
        serde_json::to_string(&arguments).map_err(|e| ToolError::new(e.to_string()))
    }
}

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct TextTool {
    text: String,
}

impl TextTool {
    /// Creates a handler answering with `text`.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

#[async_trait]
impl ToolHandler for TextTool {
    async fn call(&self, _arguments: Value) -> Result<String, ToolError> {
        Ok(self.text.clone())
    }
}

/// Adapts a synchronous closure into a [`ToolHandler`].
pub struct FnTool<F>(F);

#[async_trait]
impl<F> ToolHandler for FnTool<F>
where
    F: Fn(Value) -> Result<String, ToolError> + Send + Sync,
{
    async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        (self.0)(arguments)
    }
}

/// A tool in the catalog.
#[derive(Clone)]
pub struct Tool {
    description: String,
    input_schema: Value,
    handler: Arc<dyn ToolHandler>,
}

impl fmt::Debug for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tool")
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

impl Tool {
    /// Creates a tool backed by `handler`.
    #[must_use]
    pub fn new(
        description: impl Into<String>,
        input_schema: Value,
        handler: impl ToolHandler + 'static,
    ) -> Self {
        Self {
            description: description.into(),
            input_schema,
            handler: Arc::new(handler),
        }
    }

    /// Creates a tool backed by a synchronous closure.
    #[must_use]
    pub fn from_fn<F>(description: impl Into<String>, input_schema: Value, f: F) -> Self
    where
        F: Fn(Value) -> Result<String, ToolError> + Send + Sync + 'static,
    {
        Self::new(description, input_schema, FnTool(f))
    }

    /// Returns the human-readable description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the JSON Schema of the arguments.
    #[must_use]
    pub const fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    /// Invokes the handler.
    ///
    /// # Errors
    ///
    /// Propagates the handler's failure.
    pub async fn call(&self, arguments: Value) -> Result<String, ToolError> {
        self.handler.call(arguments).await
    }

    /// Projects this tool into its `tools/list` shape.
    #[must_use]
    pub fn definition(&self, name: &str) -> ToolDefinition {
        ToolDefinition {
            name: name.to_string(),
            description: self.description.clone(),
            parameters: self
                .input_schema
                .get("properties")
                .cloned()
                .unwrap_or_else(|| json!({})),
            input_schema: self.input_schema.clone(),
        }
    }
}

/// A tool definition for tools/list response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Unique tool name.
    pub name: String,
    /// Human-readable description.
    pub description: String,
    /// The `properties` member of the input schema.
    pub parameters: Value,
    /// JSON Schema for the tool's input parameters.
    pub input_schema: Value,
}

/// Content item in a tool call response.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Text content.
    Text {
        /// The text content.
        text: String,
    },
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallResult {
    /// Content returned by the tool.
    pub content: Vec<ToolContent>,
}

impl ToolCallResult {
    /// Creates a single-block text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
        }
    }
}
