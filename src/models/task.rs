//! # Task Model
//!
//! Handles and statuses for generation jobs running on a remote worker.
//!
//! ## Overview
//!
//! Submitting a prompt yields a [`TaskHandle`], an opaque id minted by the
//! service. Each status query returns a body that is classified into a
//! [`TaskStatus`] according to the configured [`StatusProtocol`]:
//!
//! - **Pending marker**: any body containing the marker substring is still
//!   running; anything else is the finished result. This protocol cannot
//!   express failure.
//! - **Structured**: the body is a JSON object with an explicit `status`
//!   field, so failures are reported as such.

use serde::Deserialize;
use std::fmt;
use std::time::Duration;

use crate::error::{ClientError, ClientResult};

/// Marker the generation service embeds in the status of an unfinished task
pub const DEFAULT_PENDING_MARKER: &str = "Task Pending";

/// Opaque identifier of a remote generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self(task_id.into())
    }

    pub fn task_id(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Outcome of a single status query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Pending,
    Completed(String),
    Failed(String),
}

impl TaskStatus {
    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskStatus::Pending)
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !self.is_pending()
    }
}

/// How a status body is turned into a [`TaskStatus`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusProtocol {
    /// Substring sniffing: pending while the marker is present
    PendingMarker { marker: String },
    /// JSON object with `status`, and `result` or `error`
    Structured,
}

impl Default for StatusProtocol {
    fn default() -> Self {
        Self::PendingMarker {
            marker: DEFAULT_PENDING_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct StructuredStatus {
    status: Option<String>,
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

impl StatusProtocol {
    /// An empty marker matches every body, so no task could ever finish
    pub fn validate(&self) -> ClientResult<()> {
        match self {
            StatusProtocol::PendingMarker { marker } if marker.is_empty() => Err(
                ClientError::invalid_input("pending marker must not be empty"),
            ),
            _ => Ok(()),
        }
    }

    /// Classify a raw status body
    pub fn classify(&self, body: &str) -> ClientResult<TaskStatus> {
        match self {
            StatusProtocol::PendingMarker { marker } => {
                let text = decode_status_text(body);
                if text.contains(marker.as_str()) {
                    Ok(TaskStatus::Pending)
                } else {
                    Ok(TaskStatus::Completed(text))
                }
            }
            StatusProtocol::Structured => {
                let parsed: StructuredStatus = serde_json::from_str(body).map_err(|e| {
                    ClientError::invalid_response("status", format!("not a status object: {e}"))
                })?;
                let status = parsed.status.ok_or_else(|| {
                    ClientError::invalid_response("status", "missing status field")
                })?;

                match status.to_ascii_lowercase().as_str() {
                    "pending" | "running" | "queued" => Ok(TaskStatus::Pending),
                    "completed" | "success" => Ok(TaskStatus::Completed(
                        parsed.result.map(value_text).unwrap_or_default(),
                    )),
                    "failed" | "failure" | "error" => Ok(TaskStatus::Failed(
                        parsed
                            .error
                            .map(value_text)
                            .unwrap_or_else(|| "no reason given".to_string()),
                    )),
                    other => Err(ClientError::invalid_response(
                        "status",
                        format!("unknown task status '{other}'"),
                    )),
                }
            }
        }
    }
}

/// Decode a status body into plain text.
///
/// A JSON string is unwrapped, other JSON keeps its compact JSON text, and a
/// body that is not JSON is returned as-is.
pub fn decode_status_text(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => value_text(value),
        Err(_) => body.to_string(),
    }
}

fn value_text(value: serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    }
}

/// Fixed-interval polling budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            timeout: Duration::from_secs(300),
        }
    }
}

impl PollPolicy {
    pub fn new(poll_interval: Duration, timeout: Duration) -> Self {
        Self {
            poll_interval,
            timeout,
        }
    }

    pub fn validate(&self) -> ClientResult<()> {
        if self.poll_interval.is_zero() {
            return Err(ClientError::invalid_input(
                "poll interval must be greater than zero",
            ));
        }
        Ok(())
    }

    /// Most polls a wait under this policy can issue
    #[must_use]
    pub fn max_polls(&self) -> u32 {
        if self.poll_interval.is_zero() {
            return 0;
        }
        let polls = self.timeout.as_nanos() / self.poll_interval.as_nanos();
        u32::try_from(polls).unwrap_or(u32::MAX)
    }
}
