//! The closed set of methods this server answers.
//!
//! Method names are resolved once into [`Method`]; the server matches on it
//! exhaustively, so adding a variant without a handler does not compile.

/// A method of the supported protocol version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// `initialize`
    Initialize,
    /// `ping`
    Ping,
    /// `shutdown`
    Shutdown,
    /// `exit`
    Exit,
    /// `tools/list`
    ToolsList,
    /// `tools/call`
    ToolsCall,
    /// `prompts/list`
    PromptsList,
    /// `prompts/get`
    PromptsGet,
    /// `resources/list`
    ResourcesList,
    /// `resources/read`
    ResourcesRead,
    /// `resources/templates/list`
    ResourceTemplatesList,
    /// `notifications/initialized`
    NotificationsInitialized,
    /// `notifications/cancelled`
    NotificationsCancelled,
}

impl Method {
    /// Every supported method.
    pub const ALL: [Self; 13] = [
        Self::Initialize,
        Self::Ping,
        Self::Shutdown,
        Self::Exit,
        Self::ToolsList,
        Self::ToolsCall,
        Self::PromptsList,
        Self::PromptsGet,
        Self::ResourcesList,
        Self::ResourcesRead,
        Self::ResourceTemplatesList,
        Self::NotificationsInitialized,
        Self::NotificationsCancelled,
    ];

    /// Resolves a wire method name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let method = match name {
            "initialize" => Self::Initialize,
            "ping" => Self::Ping,
            "shutdown" => Self::Shutdown,
            "exit" => Self::Exit,
            "tools/list" => Self::ToolsList,
            "tools/call" => Self::ToolsCall,
            "prompts/list" => Self::PromptsList,
            "prompts/get" => Self::PromptsGet,
            "resources/list" => Self::ResourcesList,
            "resources/read" => Self::ResourcesRead,
            "resources/templates/list" => Self::ResourceTemplatesList,
            "notifications/initialized" => Self::NotificationsInitialized,
            "notifications/cancelled" => Self::NotificationsCancelled,
            _ => return None,
        };
        Some(method)
    }

    /// Returns the wire method name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Initialize => "initialize",
            Self::Ping => "ping",
            Self::Shutdown => "shutdown",
            Self::Exit => "exit",
            Self::ToolsList => "tools/list",
            Self::ToolsCall => "tools/call",
            Self::PromptsList => "prompts/list",
            Self::PromptsGet => "prompts/get",
            Self::ResourcesList => "resources/list",
            Self::ResourcesRead => "resources/read",
            Self::ResourceTemplatesList => "resources/templates/list",
            Self::NotificationsInitialized => "notifications/initialized",
            Self::NotificationsCancelled => "notifications/cancelled",
        }
    }

    /// Returns `true` for methods that drive the session lifecycle.
    #[must_use]
    pub const fn is_lifecycle(self) -> bool {
        matches!(self, Self::Initialize | Self::Shutdown | Self::Exit)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
