//! mcp-catalog-server: single-session MCP server over stdio
//!
//! This library serves a fixed capability surface (tools, prompts and
//! resources supplied at construction) to one client over newline-delimited
//! JSON-RPC on standard input and output.
//!
//! # Architecture
//!
//! - **Frame extraction** turns an unbounded byte stream into lines
//! - **Codec** decodes requests and encodes responses
//! - **Session** tracks the initialize/shutdown/exit lifecycle
//! - **Dispatch** maps method names onto capability handlers
//!
//! Two collaborators sit outside the core: the RPC traffic log and the HTTP
//! fetcher used for remote resources.
//!
//! # Modules
//!
//! - [`catalog`] - Static tools, prompts and resources
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types
//! - [`fetch`] - Remote resource fetching
//! - [`mcp`] - MCP protocol implementation
//! - [`rpc_log`] - Rotating log of RPC traffic

pub mod catalog;
pub mod config;
pub mod error;
pub mod fetch;
pub mod mcp;
pub mod rpc_log;
