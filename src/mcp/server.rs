//! MCP server: request processing, dispatch and capability handlers.
//!
//! This module implements the MCP server lifecycle:
//!
//! 1. **Initialisation**: exact protocol version agreement
//! 2. **Operation**: answering catalog queries and tool calls
//! 3. **Shutdown/Exit**: `shutdown` disconnects, `exit` stops the loop
//!
//! Frames are processed strictly one after another. A handler that awaits
//! (a remote `resources/read`) delays the frames queued behind it.

use std::future::Future;
use std::io;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::catalog::{Catalog, Resource, ToolCallResult};
use crate::error::HandlerError;
use crate::fetch::ResourceFetcher;
use crate::mcp::dispatch::Method;
use crate::mcp::protocol::{
    decode, encode_error, encode_result, ErrorCode, JsonRpcErrorData, JsonRpcRequest,
    JsonRpcResponse, PROTOCOL_VERSION, SERVER_NAME,
};
use crate::mcp::session::{Session, SessionState};
use crate::mcp::transport::{StdioTransport, Transport};
use crate::rpc_log::{LogKind, NullRpcLog, RpcLog};

/// Server information for initialisation response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerInfo {
    /// Server name.
    pub name: String,
    /// Server version.
    pub version: String,
}

impl Default for ServerInfo {
    fn default() -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

/// Server capabilities advertised during initialisation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServerCapabilities {
    /// Tool-related capabilities.
    pub tools: ListChangedCapability,
    /// Prompt-related capabilities.
    pub prompts: ListChangedCapability,
    /// Resource-related capabilities.
    pub resources: ResourceCapabilities,
}

/// Capability of a fixed list.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListChangedCapability {
    /// Whether the list can change during the session. Always `false`.
    pub list_changed: bool,
}

/// Resource-specific capabilities.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceCapabilities {
    /// Whether clients may subscribe to resource updates.
    pub subscribe: bool,
    /// Whether the resource list can change during the session.
    pub list_changed: bool,
}

/// Result of the initialize request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// The agreed protocol version.
    pub protocol_version: &'static str,
    /// Server capabilities.
    pub capabilities: ServerCapabilities,
    /// Server identity.
    pub server_info: ServerInfo,
}

/// Client information received during initialisation.
#[derive(Debug, Clone, Deserialize)]
pub struct ClientInfo {
    /// Client name.
    pub name: String,
    /// Client version.
    #[serde(default)]
    pub version: Option<String>,
}

/// Parameters for tools/call request.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolCallParams {
    /// Name of the tool to call.
    pub name: String,
    /// Arguments for the tool.
    #[serde(default)]
    pub arguments: Value,
}

/// Parameters for prompts/get request.
#[derive(Debug, Clone, Deserialize)]
pub struct PromptGetParams {
    /// Name of the prompt.
    pub name: String,
}

/// Parameters for resources/read request.
#[derive(Debug, Clone, Deserialize)]
pub struct ResourceReadParams {
    /// URI of the resource.
    pub uri: String,
}

/// The MCP server for a static catalog.
pub struct McpServer {
    /// Connection lifecycle.
    session: Session,
    /// Tools, prompts and resources on offer.
    catalog: Catalog,
    /// Identity reported during initialisation.
    server_info: ServerInfo,
    /// Collaborator for network-scheme resources.
    fetcher: Box<dyn ResourceFetcher>,
    /// Collaborator recording RPC traffic.
    rpc_log: Box<dyn RpcLog>,
}

impl McpServer {
    /// Creates a server for `catalog` that fetches remote resources through
    /// `fetcher`. Traffic is not logged until [`McpServer::with_rpc_log`].
    #[must_use]
    pub fn new(
        server_info: ServerInfo,
        catalog: Catalog,
        fetcher: impl ResourceFetcher + 'static,
    ) -> Self {
        Self {
            session: Session::new(),
            catalog,
            server_info,
            fetcher: Box::new(fetcher),
            rpc_log: Box::new(NullRpcLog),
        }
    }

    /// Replaces the RPC traffic log.
    #[must_use]
    pub fn with_rpc_log(mut self, rpc_log: impl RpcLog + 'static) -> Self {
        self.rpc_log = Box::new(rpc_log);
        self
    }

    /// Returns the current session state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.session.state()
    }

    /// Returns the session.
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    /// Returns the catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Runs the MCP server over stdio until `exit`, end of input, or a
    /// termination signal.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn run(&mut self) -> io::Result<()> {
        let mut transport = StdioTransport::stdio();
        self.run_with_shutdown(&mut transport).await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(unix)]
    async fn run_with_shutdown(&mut self, transport: &mut StdioTransport) -> io::Result<()> {
        use tokio::signal::unix::{signal, SignalKind};

        let mut sigint = signal(SignalKind::interrupt())?;
        let mut sigterm = signal(SignalKind::terminate())?;

        let termination = async move {
            tokio::select! {
                _ = sigint.recv() => "SIGINT",
                _ = sigterm.recv() => "SIGTERM",
            }
        };

        self.serve_until(transport, termination).await
    }

    /// Runs the main loop and handles shutdown.
    #[cfg(windows)]
    async fn run_with_shutdown(&mut self, transport: &mut StdioTransport) -> io::Result<()> {
        let termination = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!(error = %e, "Failed to listen for Ctrl+C");
                std::future::pending::<()>().await;
            }
            "Ctrl+C"
        };

        self.serve_until(transport, termination).await
    }

    /// Serves `transport` until `exit`, end of input, or `termination`
    /// resolves with the name of the signal received.
    ///
    /// The signal wins over in-flight work: a pending handler (such as a slow
    /// remote fetch) is dropped and no response is written for it.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve_until<R, W>(
        &mut self,
        transport: &mut Transport<R, W>,
        termination: impl Future<Output = &'static str>,
    ) -> io::Result<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: tokio::io::AsyncWrite + Unpin,
    {
        tokio::select! {
            signal = termination => {
                self.handle_termination(signal);
                Ok(())
            }

            result = self.serve(transport) => result,
        }
    }

    /// Serves `transport` until `exit` or end of input, without signal handling.
    ///
    /// # Errors
    ///
    /// Returns an error if transport I/O fails.
    pub async fn serve<R, W>(&mut self, transport: &mut Transport<R, W>) -> io::Result<()>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: tokio::io::AsyncWrite + Unpin,
    {
        loop {
            let frames = transport.read_frames().await?;
            if !self.handle_read(frames, transport).await? {
                return Ok(());
            }
        }
    }

    /// Processes the frames of one read.
    ///
    /// Returns `false` if the server should stop.
    async fn handle_read<R, W>(
        &mut self,
        frames: Option<Vec<String>>,
        transport: &mut Transport<R, W>,
    ) -> io::Result<bool>
    where
        R: tokio::io::AsyncRead + Unpin,
        W: tokio::io::AsyncWrite + Unpin,
    {
        let Some(frames) = frames else {
            tracing::info!("Input closed, stopping server");
            return Ok(false);
        };

        for frame in frames {
            if let Some(response) = self.process_frame(&frame).await {
                transport.write_response(&response).await?;
            }

            if self.session.is_terminated() {
                tracing::info!("Exit requested, stopping server");
                return Ok(false);
            }
        }

        Ok(true)
    }

    /// Handles a termination signal.
    fn handle_termination(&mut self, signal: &str) {
        tracing::info!(signal, "Received termination signal");
        if self.session.is_connected() {
            self.log(LogKind::Info, &json!({ "message": "Server shutting down" }));
        }
        self.session.exit();
    }

    /// Decodes, dispatches and answers a single frame.
    ///
    /// Returns the response to write, or `None` for notifications and for
    /// `exit`. Undecodable frames always produce a parse error response.
    pub async fn process_frame(&mut self, frame: &str) -> Option<JsonRpcResponse> {
        let request = match decode(frame) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse message");
                let response = e.into_response();
                self.log(LogKind::Error, &response);
                return Some(response);
            }
        };

        tracing::debug!(method = %request.method, id = ?request.id, "Received message");
        self.log(LogKind::Request, &request);

        let response = self.dispatch(&request).await;

        if self.session.is_terminated() || request.is_notification() {
            return None;
        }

        let kind = if response.is_error() {
            LogKind::Error
        } else {
            LogKind::Response
        };
        self.log(kind, &response);

        Some(response)
    }

    /// Resolves the method, runs its handler and wraps the outcome.
    pub async fn dispatch(&mut self, request: &JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone();

        let Some(method) = Method::from_name(&request.method) else {
            tracing::debug!(method = %request.method, "Method not found");
            return encode_error(id, JsonRpcErrorData::from_code(ErrorCode::MethodNotFound));
        };

        if !method.is_lifecycle()
            && method != Method::Ping
            && self.session.state() == SessionState::Uninitialised
        {
            tracing::warn!(%method, "Request received before initialize");
        }

        match self.invoke(method, request.params.as_ref()).await {
            Ok(result) => encode_result(id, result),
            Err(e) => {
                tracing::warn!(%method, error = %e, "Request failed");
                encode_error(id, e.to_error_data())
            }
        }
    }

    /// Runs the handler for `method`.
    async fn invoke(&mut self, method: Method, params: Option<&Value>) -> Result<Value, HandlerError> {
        match method {
            Method::Initialize => self.handle_initialize(params),
            Method::Ping => Ok(json!({})),
            Method::Shutdown => self.handle_shutdown(),
            Method::Exit => {
                self.session.exit();
                Ok(Value::Null)
            }
            Method::ToolsList => Ok(json!({ "tools": self.catalog.tool_definitions() })),
            Method::ToolsCall => self.handle_tools_call(params).await,
            Method::PromptsList => Ok(json!({ "prompts": self.catalog.prompt_summaries() })),
            Method::PromptsGet => self.handle_prompts_get(params),
            Method::ResourcesList => Ok(json!({ "resources": self.catalog.resource_summaries() })),
            Method::ResourcesRead => self.handle_resources_read(params).await,
            Method::ResourceTemplatesList => {
                Ok(json!({ "resourceTemplates": self.catalog.templates() }))
            }
            Method::NotificationsInitialized | Method::NotificationsCancelled => Ok(Value::Null),
        }
    }

    /// Handles the initialize request.
    fn handle_initialize(&mut self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let requested = params
            .and_then(|p| p.get("protocolVersion"))
            .and_then(Value::as_str);

        self.session.initialize(requested)?;

        let client = params
            .and_then(|p| p.get("clientInfo"))
            .and_then(|c| ClientInfo::deserialize(c).ok());
        tracing::info!(
            client = client.as_ref().map(|c| c.name.as_str()),
            client_version = client.as_ref().and_then(|c| c.version.as_deref()),
            protocol_version = PROTOCOL_VERSION,
            "Session initialised"
        );

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION,
            capabilities: ServerCapabilities::default(),
            server_info: self.server_info.clone(),
        };
        Ok(serde_json::to_value(result)?)
    }

    /// Handles the shutdown request.
    fn handle_shutdown(&mut self) -> Result<Value, HandlerError> {
        self.session.shutdown()?;
        tracing::info!("Session shut down, awaiting exit");
        Ok(Value::Null)
    }

    /// Handles the tools/call request.
    async fn handle_tools_call(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let params: ToolCallParams = parse_params(Method::ToolsCall, params)?;

        let tool = self
            .catalog
            .tool(&params.name)
            .ok_or_else(|| HandlerError::ToolNotFound(params.name.clone()))?;

        tracing::debug!(tool = %params.name, "Calling tool");
        let text = tool.call(params.arguments).await?;

        Ok(serde_json::to_value(ToolCallResult::text(text))?)
    }

    /// Handles the prompts/get request.
    fn handle_prompts_get(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let params: PromptGetParams = parse_params(Method::PromptsGet, params)?;

        let prompt = self
            .catalog
            .prompt(&params.name)
            .ok_or(HandlerError::PromptNotFound(params.name))?;

        Ok(serde_json::to_value(prompt.contents())?)
    }

    /// Handles the resources/read request.
    async fn handle_resources_read(&self, params: Option<&Value>) -> Result<Value, HandlerError> {
        let params: ResourceReadParams = parse_params(Method::ResourcesRead, params)?;

        let resource = self
            .catalog
            .resource(&params.uri)
            .ok_or_else(|| HandlerError::ResourceNotFound(params.uri.clone()))?;

        if !resource.is_remote() {
            return Ok(serde_json::to_value(resource.contents())?);
        }

        let fetched = self.fetcher.fetch(&resource.uri).await?;
        let merged = Resource {
            mime_type: Some(fetched.mime_type),
            content: Some(fetched.content),
            ..resource.clone()
        };

        Ok(serde_json::to_value(merged.contents())?)
    }

    /// Passes a payload to the RPC log.
    fn log(&self, kind: LogKind, payload: &impl Serialize) {
        match serde_json::to_value(payload) {
            Ok(value) => self.rpc_log.log_line(kind, &value),
            Err(e) => tracing::warn!(error = %e, "Failed to serialise RPC log payload"),
        }
    }
}

/// Deserialises the params of `method`, which must be present.
fn parse_params<T: DeserializeOwned>(
    method: Method,
    params: Option<&Value>,
) -> Result<T, HandlerError> {
    let params =
        params.ok_or_else(|| HandlerError::InvalidParams(format!("{method} requires params")))?;

    T::deserialize(params).map_err(|e| HandlerError::InvalidParams(e.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::*;
    use crate::catalog::{EchoTool, Prompt, Tool};
    use crate::error::{FetchError, ToolError};
    use crate::fetch::FetchedResource;
    use crate::mcp::protocol::RequestId;

    struct StubFetcher;

    #[async_trait]
    impl ResourceFetcher for StubFetcher {
        async fn fetch(&self, uri: &str) -> Result<FetchedResource, FetchError> {
            if uri.contains("broken") {
                return Err(FetchError::Other("connection refused".to_string()));
            }
            Ok(FetchedResource {
                content: format!("fetched {uri}"),
                mime_type: "text/html".to_string(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct MemoryLog(Arc<Mutex<Vec<(LogKind, Value)>>>);

    impl RpcLog for MemoryLog {
        fn log_line(&self, kind: LogKind, payload: &Value) {
            self.0.lock().unwrap().push((kind, payload.clone()));
        }
    }

    fn catalog() -> Catalog {
        Catalog::new()
            .with_tool("echo", Tool::new("Echo", json!({"type": "object"}), EchoTool))
            .with_prompt("greet", Prompt::default())
            .with_resource(Resource {
                name: "local".to_string(),
                uri: "memo://local".to_string(),
                mime_type: Some("text/plain".to_string()),
                content: Some("static".to_string()),
            })
            .with_resource(Resource {
                name: "site".to_string(),
                uri: "https://example.com/page".to_string(),
                mime_type: Some("text/plain".to_string()),
                content: Some("default".to_string()),
            })
            .with_resource(Resource {
                name: "broken".to_string(),
                uri: "http://broken.invalid/".to_string(),
                mime_type: None,
                content: None,
            })
    }

    fn server() -> McpServer {
        McpServer::new(ServerInfo::default(), catalog(), StubFetcher)
    }

    async fn call(server: &mut McpServer, frame: &str) -> Value {
        let response = server.process_frame(frame).await.expect("response");
        serde_json::to_value(response).unwrap()
    }

    async fn initialise(server: &mut McpServer) {
        let response = call(
            server,
            r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        )
        .await;
        assert!(response.get("result").is_some());
    }

    #[test]
    fn server_initial_state() {
        assert_eq!(server().state(), SessionState::Uninitialised);
    }

    #[tokio::test]
    async fn ping() {
        let mut server = server();
        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).await;
        assert_eq!(response, json!({"jsonrpc": "2.0", "id": 1, "result": {}}));
    }

    #[tokio::test]
    async fn unknown_method() {
        let mut server = server();
        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":2,"method":"bogus"}"#).await;
        assert_eq!(
            response,
            json!({"jsonrpc": "2.0", "id": 2, "error": {"code": -32601, "message": "Method not found"}})
        );
    }

    #[tokio::test]
    async fn initialize_result_shape() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05","clientInfo":{"name":"test"}}}"#,
        )
        .await;

        let result = &response["result"];
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(result["capabilities"]["tools"]["listChanged"], false);
        assert_eq!(result["capabilities"]["resources"]["subscribe"], false);
        assert_eq!(server.state(), SessionState::Ready);
    }

    #[tokio::test]
    async fn initialize_wrong_version() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2099-01-01"}}"#,
        )
        .await;

        assert_eq!(response["id"], 1);
        assert_eq!(response["error"]["code"], -32600);
        assert_eq!(response["error"]["message"], "Protocol version not supported");
        assert_eq!(server.state(), SessionState::Uninitialised);
    }

    #[tokio::test]
    async fn notification_produces_no_response() {
        let mut server = server();
        for frame in [
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/cancelled","params":{"requestId":1}}"#,
            r#"{"jsonrpc":"2.0","method":"bogus"}"#,
            r#"{"jsonrpc":"2.0","method":"tools/call","params":{"name":"missing"}}"#,
        ] {
            assert!(server.process_frame(frame).await.is_none(), "{frame}");
        }
    }

    #[tokio::test]
    async fn tools_call_echo() {
        let mut server = server();
        initialise(&mut server).await;
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":"t","method":"tools/call","params":{"name":"echo","arguments":{"text":"hi"}}}"#,
        )
        .await;
        assert_eq!(
            response["result"],
            json!({"content": [{"type": "text", "text": "hi"}]})
        );
    }

    #[tokio::test]
    async fn unknown_tool_never_invokes_a_handler() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let catalog = Catalog::new().with_tool(
            "count",
            Tool::from_fn("", json!({}), move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(String::new())
            }),
        );
        let mut server = McpServer::new(ServerInfo::default(), catalog, StubFetcher);

        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":3,"method":"tools/call","params":{"name":"counter"}}"#,
        )
        .await;

        assert_eq!(response["error"]["message"], "Tool not found");
        assert_eq!(response["error"]["data"]["name"], "counter");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn tool_failure_is_internal_error() {
        let catalog = Catalog::new().with_tool(
            "fail",
            Tool::from_fn("", json!({}), |_| Err(ToolError::new("disk full"))),
        );
        let mut server = McpServer::new(ServerInfo::default(), catalog, StubFetcher);

        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":4,"method":"tools/call","params":{"name":"fail"}}"#,
        )
        .await;
        assert_eq!(response["id"], 4);
        assert_eq!(response["error"]["code"], -32603);
        assert_eq!(response["error"]["message"], "Tool execution failed: disk full");
    }

    #[tokio::test]
    async fn missing_params_are_invalid() {
        let mut server = server();
        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":5,"method":"tools/call"}"#).await;
        assert_eq!(response["error"]["code"], -32602);

        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":6,"method":"resources/read","params":{"url":"x"}}"#,
        )
        .await;
        assert_eq!(response["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn prompts_get_unknown() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":7,"method":"prompts/get","params":{"name":"nope"}}"#,
        )
        .await;
        assert_eq!(response["error"]["message"], "Prompt not found");
    }

    #[tokio::test]
    async fn resources_read_static() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":8,"method":"resources/read","params":{"uri":"memo://local"}}"#,
        )
        .await;
        assert_eq!(
            response["result"]["contents"][0],
            json!({"uri": "memo://local", "mimeType": "text/plain", "text": "static"})
        );
    }

    #[tokio::test]
    async fn resources_read_remote_uses_fetcher() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":9,"method":"resources/read","params":{"uri":"https://example.com/page"}}"#,
        )
        .await;
        assert_eq!(
            response["result"]["contents"][0],
            json!({
                "uri": "https://example.com/page",
                "mimeType": "text/html",
                "text": "fetched https://example.com/page"
            })
        );
    }

    #[tokio::test]
    async fn resources_read_fetch_failure() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":10,"method":"resources/read","params":{"uri":"http://broken.invalid/"}}"#,
        )
        .await;
        assert_eq!(response["id"], 10);
        assert_eq!(response["error"]["code"], -32603);
        assert_eq!(
            response["error"]["message"],
            "Failed to fetch resource: connection refused"
        );
    }

    #[tokio::test]
    async fn resource_templates_list_empty() {
        let mut server = server();
        let response = call(
            &mut server,
            r#"{"jsonrpc":"2.0","id":11,"method":"resources/templates/list"}"#,
        )
        .await;
        assert_eq!(response["result"], json!({"resourceTemplates": []}));
    }

    #[tokio::test]
    async fn shutdown_then_exit() {
        let mut server = server();
        initialise(&mut server).await;

        let response = call(&mut server, r#"{"jsonrpc":"2.0","id":12,"method":"shutdown"}"#).await;
        assert_eq!(response["result"], Value::Null);
        assert_eq!(server.state(), SessionState::ShuttingDown);

        assert!(server
            .process_frame(r#"{"jsonrpc":"2.0","id":13,"method":"exit"}"#)
            .await
            .is_none());
        assert_eq!(server.state(), SessionState::Terminated);
    }

    #[tokio::test]
    async fn parse_error_response() {
        let mut server = server();
        let response = call(&mut server, "{not json").await;
        assert_eq!(response["id"], Value::Null);
        assert_eq!(response["error"]["code"], -32700);
        assert_eq!(response["error"]["message"], "Parse error");
        assert!(response["error"]["data"].is_string());
    }

    #[tokio::test]
    async fn traffic_is_logged() {
        let log = MemoryLog::default();
        let mut server = server().with_rpc_log(log.clone());

        call(&mut server, r#"{"jsonrpc":"2.0","id":1,"method":"ping"}"#).await;
        call(&mut server, r#"{"jsonrpc":"2.0","id":2,"method":"bogus"}"#).await;
        call(&mut server, "garbage").await;
        server
            .process_frame(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
            .await;

        let kinds: Vec<_> = log.0.lock().unwrap().iter().map(|(k, _)| *k).collect();
        assert_eq!(
            kinds,
            [
                LogKind::Request,
                LogKind::Response,
                LogKind::Request,
                LogKind::Error,
                LogKind::Error,
                LogKind::Request,
            ]
        );
    }

    #[tokio::test]
    async fn termination_logs_only_when_connected() {
        let log = MemoryLog::default();
        let mut server = server().with_rpc_log(log.clone());
        server.handle_termination("SIGTERM");
        assert!(log.0.lock().unwrap().is_empty());
        assert!(server.session().is_terminated());

        let log = MemoryLog::default();
        let mut server = self::server().with_rpc_log(log.clone());
        initialise(&mut server).await;
        log.0.lock().unwrap().clear();
        server.handle_termination("SIGTERM");
        let records = log.0.lock().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, LogKind::Info);
        assert_eq!(records[0].1["message"], "Server shutting down");
    }

    /// Never completes a fetch; records that one was started.
    struct HangingFetcher(Arc<AtomicBool>);

    #[async_trait]
    impl ResourceFetcher for HangingFetcher {
        async fn fetch(&self, _uri: &str) -> Result<FetchedResource, FetchError> {
            self.0.store(true, Ordering::SeqCst);
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn signal_interrupts_pending_fetch() {
        let started = Arc::new(AtomicBool::new(false));
        let log = MemoryLog::default();
        let mut server = McpServer::new(
            ServerInfo::default(),
            catalog(),
            HangingFetcher(Arc::clone(&started)),
        )
        .with_rpc_log(log.clone());

        let input = concat!(
            r#"{"jsonrpc":"2.0","id":0,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":1,"method":"resources/read","params":{"uri":"https://example.com/page"}}"#,
            "\n",
            r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#,
            "\n",
        );
        let mut transport = Transport::new(input.as_bytes(), Vec::new());

        let termination = std::future::poll_fn(|cx| {
            if started.load(Ordering::SeqCst) {
                std::task::Poll::Ready("SIGTERM")
            } else {
                cx.waker().wake_by_ref();
                std::task::Poll::Pending
            }
        });
        server.serve_until(&mut transport, termination).await.unwrap();

        assert!(server.session().is_terminated());
        let output = String::from_utf8(transport.into_writer()).unwrap();
        assert_eq!(output.lines().count(), 1);
        assert!(output.contains(r#""id":0"#));

        let records = log.0.lock().unwrap();
        let (kind, payload) = records.last().unwrap();
        assert_eq!(*kind, LogKind::Info);
        assert_eq!(payload["message"], "Server shutting down");
    }

    #[tokio::test]
    async fn serve_until_returns_at_end_of_input() {
        let mut server = server();
        let mut transport = Transport::new(
            &b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n"[..],
            Vec::new(),
        );
        server
            .serve_until(&mut transport, std::future::pending::<&'static str>())
            .await
            .unwrap();

        assert_eq!(server.state(), SessionState::Uninitialised);
        let output = String::from_utf8(transport.into_writer()).unwrap();
        assert_eq!(output, "{\"jsonrpc\":\"2.0\",\"id\":1,\"result\":{}}\n");
    }

    #[tokio::test]
    async fn dispatch_echoes_string_ids() {
        let mut server = server();
        let request = JsonRpcRequest {
            id: Some(RequestId::from("abc")),
            method: "ping".to_string(),
            params: None,
        };
        let response = server.dispatch(&request).await;
        assert_eq!(response.id, Some(RequestId::from("abc")));
        assert_eq!(response.result(), Some(&json!({})));
    }
}
