//! Connection lifecycle for the single client session.
//!
//! ```text
//! Uninitialised ──initialize──▶ Ready ──shutdown──▶ ShuttingDown
//!       │                         │                      │
//!       └──────────── exit ───────┴──────── exit ────────┴──▶ Terminated
//! ```
//!
//! Only `initialize`, `shutdown` and `exit` change the state. Other methods are
//! served in any state; the state drives logging and termination behaviour.

use crate::error::HandlerError;
use crate::mcp::protocol::PROTOCOL_VERSION;

/// Session state in the MCP lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for initialize request.
    Uninitialised,
    /// Handshake complete; the client is connected.
    Ready,
    /// `shutdown` received; waiting for `exit`.
    ShuttingDown,
    /// `exit` received; no further output is produced.
    Terminated,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Uninitialised => "uninitialised",
            Self::Ready => "ready",
            Self::ShuttingDown => "shutting-down",
            Self::Terminated => "terminated",
        };
        f.write_str(name)
    }
}

/// The process-lifetime session.
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    protocol_version: Option<String>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session in the [`SessionState::Uninitialised`] state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: SessionState::Uninitialised,
            protocol_version: None,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Returns `true` between a successful `initialize` and `shutdown`.
    #[must_use]
    pub const fn is_connected(&self) -> bool {
        matches!(self.state, SessionState::Ready)
    }

    /// Returns `true` once `exit` has been received.
    #[must_use]
    pub const fn is_terminated(&self) -> bool {
        matches!(self.state, SessionState::Terminated)
    }

    /// Returns the agreed protocol version, once initialised.
    #[must_use]
    pub fn protocol_version(&self) -> Option<&str> {
        self.protocol_version.as_deref()
    }

    /// Completes the handshake.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::UnsupportedProtocolVersion`] unless `requested`
    /// is exactly [`PROTOCOL_VERSION`], and [`HandlerError::AlreadyInitialised`]
    /// outside the uninitialised state. The state is unchanged on error.
    pub fn initialize(&mut self, requested: Option<&str>) -> Result<(), HandlerError> {
        if requested != Some(PROTOCOL_VERSION) {
            return Err(HandlerError::UnsupportedProtocolVersion {
                requested: requested.map(str::to_string),
            });
        }
        if self.state != SessionState::Uninitialised {
            return Err(HandlerError::AlreadyInitialised);
        }

        self.protocol_version = Some(PROTOCOL_VERSION.to_string());
        self.state = SessionState::Ready;
        Ok(())
    }

    /// Marks the client as disconnected while keeping the process alive.
    ///
    /// Repeated calls are accepted.
    ///
    /// # Errors
    ///
    /// Returns [`HandlerError::NotInitialised`] before the handshake.
    pub fn shutdown(&mut self) -> Result<(), HandlerError> {
        match self.state {
            SessionState::Ready | SessionState::ShuttingDown => {
                self.state = SessionState::ShuttingDown;
                Ok(())
            }
            SessionState::Uninitialised | SessionState::Terminated => {
                Err(HandlerError::NotInitialised)
            }
        }
    }

    /// Moves to the terminal state. Valid from any state.
    pub fn exit(&mut self) {
        self.state = SessionState::Terminated;
    }
}
