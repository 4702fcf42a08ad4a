//! Static catalogs of tools, prompts and resources.
//!
//! Catalogs are assembled before the server starts and never change
//! afterwards. Listing operations follow insertion order.

mod prompt;
mod resource;
mod tool;

pub use prompt::{Prompt, PromptArgument, PromptContents, PromptSummary};
pub use resource::{
    is_network_uri, Resource, ResourceContents, ResourceReadResult, ResourceSummary,
    ResourceTemplate, EMPTY_CONTENT_PLACEHOLDER,
};
pub use tool::{
    EchoTool, FnTool, TextTool, Tool, ToolCallResult, ToolContent, ToolDefinition, ToolHandler,
};

use indexmap::IndexMap;

/// The read-only capability surface exposed to the client.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    tools: IndexMap<String, Tool>,
    prompts: IndexMap<String, Prompt>,
    resources: IndexMap<String, Resource>,
    templates: Vec<ResourceTemplate>,
}

impl Catalog {
    /// Creates an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a tool. A tool with the same name is replaced in place.
    #[must_use]
    pub fn with_tool(mut self, name: impl Into<String>, tool: Tool) -> Self {
        self.tools.insert(name.into(), tool);
        self
    }

    /// Adds a prompt. A prompt with the same name is replaced in place.
    #[must_use]
    pub fn with_prompt(mut self, name: impl Into<String>, prompt: Prompt) -> Self {
        self.prompts.insert(name.into(), prompt);
        self
    }

    /// Adds a resource keyed by its URI. A resource with the same URI is
    /// replaced in place.
    #[must_use]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resources.insert(resource.uri.clone(), resource);
        self
    }

    /// Adds a resource template.
    #[must_use]
    pub fn with_template(mut self, template: ResourceTemplate) -> Self {
        self.templates.push(template);
        self
    }

    /// Looks up a tool by name.
    #[must_use]
    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Looks up a prompt by name.
    #[must_use]
    pub fn prompt(&self, name: &str) -> Option<&Prompt> {
        self.prompts.get(name)
    }

    /// Looks up a resource by URI.
    #[must_use]
    pub fn resource(&self, uri: &str) -> Option<&Resource> {
        self.resources.get(uri)
    }

    /// Tool definitions in insertion order.
    #[must_use]
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|(name, tool)| tool.definition(name))
            .collect()
    }

    /// Prompt summaries in insertion order.
    #[must_use]
    pub fn prompt_summaries(&self) -> Vec<PromptSummary> {
        self.prompts
            .iter()
            .map(|(name, prompt)| prompt.summary(name))
            .collect()
    }

    /// Resource summaries in insertion order.
    #[must_use]
    pub fn resource_summaries(&self) -> Vec<ResourceSummary> {
        self.resources.values().map(Resource::summary).collect()
    }

    /// Resource templates in insertion order.
    #[must_use]
    pub fn templates(&self) -> &[ResourceTemplate] {
        &self.templates
    }
}
