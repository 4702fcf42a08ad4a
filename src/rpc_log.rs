//! Persistent log of RPC traffic.
//!
//! Every inbound request, outbound response and error is recorded as one JSON
//! line `{"timestamp", "type", "data"}`. The file keeps only the most recent
//! lines. Logging is best-effort: failures are reported through `tracing` and
//! never reach the client.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// Name of the log file inside the log directory.
pub const LOG_FILE_NAME: &str = "server.log";

/// Default cap on retained log lines.
pub const DEFAULT_MAX_LINES: usize = 100;

/// Category of a log record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    /// Decoded inbound request or notification.
    Request,
    /// Successful outbound response.
    Response,
    /// Outbound error response.
    Error,
    /// Server lifecycle event.
    Info,
}

/// Sink for RPC traffic records.
///
/// Implementations must not panic and must not report failures to the caller.
pub trait RpcLog: Send + Sync {
    /// Records one event.
    fn log_line(&self, kind: LogKind, payload: &Value);
}

/// Discards every record.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRpcLog;

impl RpcLog for NullRpcLog {
    fn log_line(&self, _kind: LogKind, _payload: &Value) {}
}

/// Appends records to `<dir>/server.log`, trimming it to `max_lines`.
#[derive(Debug, Clone)]
pub struct FileRpcLog {
    path: PathBuf,
    max_lines: usize,
}

impl FileRpcLog {
    /// Creates a log writing into `dir`. The directory is created on first write.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, max_lines: usize) -> Self {
        Self {
            path: dir.into().join(LOG_FILE_NAME),
            max_lines: max_lines.max(1),
        }
    }

    /// Returns the log file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }

        self.rotate()?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{line}")
    }

    /// Drops the oldest lines so that one more append stays within the cap.
    fn rotate(&self) -> std::io::Result<()> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e),
        };

        let lines: Vec<&str> = contents.lines().filter(|l| !l.trim().is_empty()).collect();
        let keep = self.max_lines - 1;
        if lines.len() <= keep {
            return Ok(());
        }

        let mut trimmed = lines[lines.len() - keep..].join("\n");
        if !trimmed.is_empty() {
            trimmed.push('\n');
        }
        fs::write(&self.path, trimmed)
    }
}

impl RpcLog for FileRpcLog {
    fn log_line(&self, kind: LogKind, payload: &Value) {
        let record = json!({
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            "type": kind,
            "data": payload,
        });

        if let Err(e) = self.append(&record.to_string()) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to write RPC log line");
        }
    }
}

/// Returns the platform log directory for `app_name`.
///
/// - **Linux:** `~/.local/share/logs/<app>`
/// - **macOS:** `~/Library/Logs/<app>`
/// - **Windows:** `~/AppData/Local/Logs/<app>`
/// - **Other:** `~/.logs/<app>`
#[must_use]
pub fn default_log_dir(app_name: &str) -> Option<PathBuf> {
    let home = dirs::home_dir()?;
    let base = if cfg!(target_os = "linux") {
        home.join(".local/share/logs")
    } else if cfg!(target_os = "macos") {
        home.join("Library/Logs")
    } else if cfg!(target_os = "windows") {
        home.join("AppData/Local/Logs")
    } else {
        home.join(".logs")
    };
    Some(base.join(app_name))
}
