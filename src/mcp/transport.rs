//! stdio transport for MCP server.
//!
//! This module implements the stdio transport as specified by MCP:
//!
//! - Messages are UTF-8 encoded JSON-RPC
//! - Messages are delimited by newlines
//! - Messages must not contain embedded newlines
//! - stdin: receives messages from client
//! - stdout: sends messages to client
//! - stderr: may be used for logging (not MCP messages)
//!
//! [`Transport`] is generic over any Tokio reader and writer so the server can
//! be driven from memory in tests; [`StdioTransport`] is the production alias.

use std::io;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::mcp::framing::FrameReader;
use crate::mcp::protocol::JsonRpcResponse;

/// Size of a single read from the input stream.
const READ_CHUNK_SIZE: usize = 8 * 1024;

/// A newline-delimited JSON-RPC transport.
pub struct Transport<R, W> {
    /// Input byte stream.
    reader: R,
    /// Output byte stream.
    writer: W,
    /// Frame extraction state.
    frames: FrameReader,
    /// Scratch buffer for reads.
    chunk: Box<[u8]>,
}

/// A stdio-based MCP transport.
pub type StdioTransport = Transport<tokio::io::Stdin, tokio::io::Stdout>;

impl StdioTransport {
    /// Creates a transport over the process's stdin and stdout.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(tokio::io::stdin(), tokio::io::stdout())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::stdio()
    }
}

impl<R, W> Transport<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// Creates a transport over the given streams.
    #[must_use]
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            frames: FrameReader::new(),
            chunk: vec![0; READ_CHUNK_SIZE].into_boxed_slice(),
        }
    }

    /// Reads the next chunk and returns the frames it completes.
    ///
    /// The returned list may be empty if the chunk ended mid-frame. Returns
    /// `None` at end of input; an unterminated remainder is discarded.
    ///
    /// This method is cancel-safe: if the future is dropped before completing,
    /// no input is lost.
    ///
    /// # Errors
    ///
    /// Returns an error if reading from the input fails.
    pub async fn read_frames(&mut self) -> io::Result<Option<Vec<String>>> {
        let n = self.reader.read(&mut self.chunk).await?;

        if n == 0 {
            let dropped = self.frames.clear();
            if dropped > 0 {
                tracing::warn!(bytes = dropped, "Discarding unterminated input at end of stream");
            }
            return Ok(None);
        }

        Ok(Some(self.frames.feed(&self.chunk[..n])))
    }

    /// Writes a JSON-RPC response.
    ///
    /// The response is serialised to JSON and terminated with a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialisation or writing fails.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> io::Result<()> {
        let json = serde_json::to_string(response)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

        self.write_raw(&json).await
    }

    /// Writes a raw JSON string with newline termination.
    async fn write_raw(&mut self, json: &str) -> io::Result<()> {
        // MCP stdio framing forbids embedded newlines
        debug_assert!(
            !json.contains('\n'),
            "JSON message must not contain embedded newlines"
        );

        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        Ok(())
    }

    /// Consumes the transport, returning the output stream.
    pub fn into_writer(self) -> W {
        self.writer
    }
}
