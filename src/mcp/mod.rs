//! Model Context Protocol (MCP) server implementation.
//!
//! This module implements a single-session MCP server that exposes a static
//! catalog of tools, prompts and resources. The server communicates over
//! stdio transport using newline-delimited JSON-RPC 2.0 messages.
//!
//! # Architecture
//!
//! ```text
//! bytes ─▶ framing ─▶ protocol::decode ─▶ session ─▶ dispatch ─▶ handler
//!                                                                   │
//! bytes ◀─ transport ◀──────────── protocol::encode_* ◀─────────────┘
//! ```
//!
//! # Protocol Version
//!
//! This implementation targets MCP protocol version 2024-11-05 and accepts no
//! other.

pub mod dispatch;
pub mod framing;
pub mod protocol;
pub mod server;
pub mod session;
pub mod transport;

pub use dispatch::Method;
pub use framing::FrameReader;
pub use protocol::{JsonRpcErrorData, JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
pub use server::{McpServer, ServerInfo};
pub use session::{Session, SessionState};
pub use transport::{StdioTransport, Transport};
