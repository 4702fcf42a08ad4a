//! Resource catalog entries.

use serde::{Deserialize, Serialize};

/// Text returned by `resources/read` when a resource has no content.
pub const EMPTY_CONTENT_PLACEHOLDER: &str = "No content to display";

/// A resource in the catalog, keyed by its URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Display name.
    pub name: String,
    /// Unique URI.
    pub uri: String,
    /// MIME type of the static content.
    pub mime_type: Option<String>,
    /// Static content.
    pub content: Option<String>,
}

impl Resource {
    /// Returns `true` if reading this resource requires a network fetch.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        is_network_uri(&self.uri)
    }

    /// Projects this resource into its `resources/list` shape.
    #[must_use]
    pub fn summary(&self) -> ResourceSummary {
        ResourceSummary {
            name: self.name.clone(),
            uri: self.uri.clone(),
            mime_type: self.mime_type.clone(),
        }
    }

    /// Projects this resource into its `resources/read` shape.
    #[must_use]
    pub fn contents(&self) -> ResourceReadResult {
        ResourceReadResult {
            contents: vec![ResourceContents {
                uri: self.uri.clone(),
                mime_type: self.mime_type.clone(),
                text: self
                    .content
                    .as_deref()
                    .filter(|c| !c.is_empty())
                    .unwrap_or(EMPTY_CONTENT_PLACEHOLDER)
                    .to_string(),
            }],
        }
    }
}

/// Returns `true` for `http://` and `https://` URIs, ignoring case.
#[must_use]
pub fn is_network_uri(uri: &str) -> bool {
    let Some((scheme, _)) = uri.split_once("://") else {
        return false;
    };
    scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https")
}

/// A parameterised resource advertised by `resources/templates/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceTemplate {
    /// Display name.
    pub name: String,
    /// RFC 6570 URI template.
    pub uri_template: String,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type of matching resources.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Entry of a `resources/list` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSummary {
    /// Display name.
    pub name: String,
    /// Unique URI.
    pub uri: String,
    /// MIME type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// One content item of a `resources/read` result.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// URI of the resource read.
    pub uri: String,
    /// MIME type of `text`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    /// Textual content.
    pub text: String,
}

/// Result of `resources/read`.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceReadResult {
    /// Always exactly one item.
    pub contents: Vec<ResourceContents>,
}
