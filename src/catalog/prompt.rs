//! Prompt catalog entries.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// An argument a prompt accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromptArgument {
    /// Argument name.
    pub name: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the client must supply it.
    #[serde(default)]
    pub required: bool,
}

/// A prompt in the catalog.
///
/// Messages are returned verbatim by `prompts/get`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Prompt {
    /// Human-readable description.
    pub description: Option<String>,
    /// Declared arguments.
    pub arguments: Vec<PromptArgument>,
    /// Message list, in wire form.
    pub messages: Vec<Value>,
}

impl Prompt {
    /// Projects this prompt into its `prompts/list` shape.
    #[must_use]
    pub fn summary(&self, name: &str) -> PromptSummary {
        PromptSummary {
            name: name.to_string(),
            description: self.description.clone(),
            arguments: self.arguments.clone(),
        }
    }

    /// Projects this prompt into its `prompts/get` shape.
    #[must_use]
    pub fn contents(&self) -> PromptContents {
        PromptContents {
            description: self.description.clone(),
            messages: self.messages.clone(),
        }
    }
}

/// Entry of a `prompts/list` result.
#[derive(Debug, Clone, Serialize)]
pub struct PromptSummary {
    /// Prompt name.
    pub name: String,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Declared arguments.
    pub arguments: Vec<PromptArgument>,
}

/// Result of `prompts/get`.
#[derive(Debug, Clone, Serialize)]
pub struct PromptContents {
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Message list, verbatim.
    pub messages: Vec<Value>,
}
