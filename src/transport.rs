//! # Generation Transport Abstraction
//!
//! The narrow interface between [`TaskClient`](crate::TaskClient) and the
//! wire. The task client owns validation, status classification and the
//! polling loop; a transport only moves one request and one response.
//!
//! [`RestGenerationTransport`](crate::api_clients::RestGenerationTransport)
//! speaks HTTP. Tests plug in scripted transports to drive the polling loop
//! without a network.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::models::{GenerationRequest, TaskHandle};

/// Common interface for generation service transports.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    /// Get the transport name for debugging/logging.
    fn transport_name(&self) -> &'static str;

    /// Get the endpoint URL.
    fn endpoint(&self) -> &str;

    /// Hand a validated request to the service and return its task handle.
    async fn submit(&self, request: &GenerationRequest) -> ClientResult<TaskHandle>;

    /// Fetch the raw status body for a task.
    async fn fetch_status(&self, handle: &TaskHandle) -> ClientResult<String>;
}
