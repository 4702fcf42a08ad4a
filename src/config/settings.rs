//! Configuration structures for deserialisation.
//!
//! These structures map directly to the JSON configuration file format.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::{
    Catalog, EchoTool, Prompt, PromptArgument, Resource, ResourceTemplate, TextTool, Tool,
};
use crate::error::ConfigError;
use crate::mcp::protocol::SERVER_NAME;
use crate::mcp::server::ServerInfo;
use crate::rpc_log::DEFAULT_MAX_LINES;

/// Root configuration structure.
///
/// This is the top-level structure that matches the JSON config file.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Optional JSON schema reference (ignored during parsing).
    #[serde(rename = "$schema", default)]
    _schema: Option<String>,

    /// Optional comment field (ignored during parsing).
    #[serde(rename = "_comment", default)]
    _comment: Option<String>,

    /// Identity reported during `initialize`.
    #[serde(default)]
    pub server: ServerConfig,

    /// Diagnostic logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// RPC traffic log settings.
    #[serde(default)]
    pub rpc_log: RpcLogConfig,

    /// Remote resource fetch settings.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Tool catalog, in listing order.
    #[serde(default)]
    pub tools: Vec<ToolConfig>,

    /// Prompt catalog, in listing order.
    #[serde(default)]
    pub prompts: Vec<PromptConfig>,

    /// Resource catalog, in listing order.
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,

    /// Resource templates, in listing order.
    #[serde(default)]
    pub resource_templates: Vec<ResourceTemplateConfig>,
}

impl Config {
    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any validation checks fail.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.rpc_log.max_lines == 0 {
            return Err(invalid("rpc_log.max_lines must be at least 1"));
        }
        if self.fetch.timeout_secs == 0 {
            return Err(invalid("fetch.timeout_secs must be at least 1"));
        }

        let mut seen = HashSet::new();
        for tool in &self.tools {
            if tool.name.is_empty() {
                return Err(invalid("tool name cannot be empty"));
            }
            if !seen.insert(tool.name.as_str()) {
                return Err(invalid(format!("duplicate tool name '{}'", tool.name)));
            }
            if !tool.input_schema.is_object() {
                return Err(invalid(format!(
                    "input_schema of tool '{}' must be a JSON object",
                    tool.name
                )));
            }
        }

        let mut seen = HashSet::new();
        for prompt in &self.prompts {
            if prompt.name.is_empty() {
                return Err(invalid("prompt name cannot be empty"));
            }
            if !seen.insert(prompt.name.as_str()) {
                return Err(invalid(format!("duplicate prompt name '{}'", prompt.name)));
            }
        }

        let mut seen = HashSet::new();
        for resource in &self.resources {
            if resource.uri.is_empty() {
                return Err(invalid(format!(
                    "resource '{}' has an empty uri",
                    resource.name
                )));
            }
            if !seen.insert(resource.uri.as_str()) {
                return Err(invalid(format!("duplicate resource uri '{}'", resource.uri)));
            }
        }

        for template in &self.resource_templates {
            if template.uri_template.is_empty() {
                return Err(invalid(format!(
                    "resource template '{}' has an empty uri_template",
                    template.name
                )));
            }
        }

        Ok(())
    }

    /// Returns the identity reported during `initialize`.
    #[must_use]
    pub fn server_info(&self) -> ServerInfo {
        ServerInfo {
            name: self.server.name.clone(),
            version: self.server.version.clone(),
        }
    }

    /// Builds the static catalog described by this configuration.
    #[must_use]
    pub fn catalog(&self) -> Catalog {
        let mut catalog = Catalog::new();

        for tool in &self.tools {
            let entry = match &tool.handler {
                ToolHandlerConfig::Echo => {
                    Tool::new(&tool.description, tool.input_schema.clone(), EchoTool)
                }
                ToolHandlerConfig::Text { text } => Tool::new(
                    &tool.description,
                    tool.input_schema.clone(),
                    TextTool::new(text),
                ),
            };
            catalog = catalog.with_tool(&tool.name, entry);
        }

        for prompt in &self.prompts {
            catalog = catalog.with_prompt(
                &prompt.name,
                Prompt {
                    description: prompt.description.clone(),
                    arguments: prompt.arguments.clone(),
                    messages: prompt.messages.clone(),
                },
            );
        }

        for resource in &self.resources {
            catalog = catalog.with_resource(Resource {
                name: resource.name.clone(),
                uri: resource.uri.clone(),
                mime_type: resource.mime_type.clone(),
                content: resource.content.clone(),
            });
        }

        for template in &self.resource_templates {
            catalog = catalog.with_template(ResourceTemplate {
                name: template.name.clone(),
                uri_template: template.uri_template.clone(),
                description: template.description.clone(),
                mime_type: template.mime_type.clone(),
            });
        }

        catalog
    }
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        message: message.into(),
    }
}

/// Server identity.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Server name. Default: the crate name.
    #[serde(default = "default_server_name")]
    pub name: String,

    /// Server version. Default: the crate version.
    #[serde(default = "default_server_version")]
    pub version: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: default_server_name(),
            version: default_server_version(),
        }
    }
}

fn default_server_name() -> String {
    SERVER_NAME.to_string()
}

fn default_server_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

/// RPC traffic log configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RpcLogConfig {
    /// Whether traffic is written to disk.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log directory. Default: the platform log directory.
    #[serde(default)]
    pub directory: Option<PathBuf>,

    /// Maximum number of retained lines.
    #[serde(default = "default_max_lines")]
    pub max_lines: usize,
}

impl Default for RpcLogConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            directory: None,
            max_lines: default_max_lines(),
        }
    }
}

const fn default_true() -> bool {
    true
}

const fn default_max_lines() -> usize {
    DEFAULT_MAX_LINES
}

/// Remote fetch configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FetchConfig {
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// `User-Agent` header. Default: `<crate name>/<crate version>`.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl FetchConfig {
    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

const fn default_timeout_secs() -> u64 {
    30
}

/// A configured tool.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToolConfig {
    /// Unique tool name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// JSON Schema of the arguments.
    #[serde(default = "default_input_schema")]
    pub input_schema: Value,

    /// Built-in behaviour backing the tool.
    pub handler: ToolHandlerConfig,
}

fn default_input_schema() -> Value {
    json!({ "type": "object", "properties": {} })
}

/// Built-in tool behaviours available from configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolHandlerConfig {
    /// Return the `text` argument, or the arguments as JSON.
    Echo,
    /// Return fixed text.
    Text {
        /// The text returned on every call.
        text: String,
    },
}

/// A configured prompt.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptConfig {
    /// Unique prompt name.
    pub name: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// Declared arguments.
    #[serde(default)]
    pub arguments: Vec<PromptArgument>,

    /// Message list in wire form.
    #[serde(default)]
    pub messages: Vec<Value>,
}

/// A configured resource.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceConfig {
    /// Display name.
    pub name: String,

    /// Unique URI. `http`/`https` URIs are fetched on read.
    pub uri: String,

    /// MIME type of the static content.
    #[serde(default)]
    pub mime_type: Option<String>,

    /// Static content.
    #[serde(default)]
    pub content: Option<String>,
}

/// A configured resource template.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ResourceTemplateConfig {
    /// Display name.
    pub name: String,

    /// RFC 6570 URI template.
    pub uri_template: String,

    /// Human-readable description.
    #[serde(default)]
    pub description: Option<String>,

    /// MIME type of matching resources.
    #[serde(default)]
    pub mime_type: Option<String>,
}
