//! # Task Client
//!
//! Submits generation requests and waits for the remote worker to finish them.
//!
//! ## Polling Contract
//!
//! `await_result` polls at a fixed interval with no backoff. Every round first
//! waits one interval and then issues a single status query, so a result that
//! becomes available `t` after the wait starts is seen within
//! `ceil(t / poll_interval)` polls. Before each wait the client checks whether
//! the next poll would land past the deadline and gives up with
//! [`ClientError::Timeout`] if so: a 5s budget at a 2s interval polls exactly
//! twice. The deadline is not enforced inside a poll; a slow status request
//! is bounded only by the HTTP timeout.
//!
//! The wait between polls races the caller's [`CancelSignal`], so a wait can
//! be abandoned early without waiting out the interval.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::api_clients::RestGenerationTransport;
use crate::cancel::CancelSignal;
use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};
use crate::logging::{log_error, log_task_operation};
use crate::models::{
    GenerationParameters, GenerationRequest, PollPolicy, StatusProtocol, TaskHandle, TaskStatus,
};
use crate::transport::GenerationTransport;

/// Client for one remote generation service
#[derive(Clone)]
pub struct TaskClient {
    transport: Arc<dyn GenerationTransport>,
    protocol: StatusProtocol,
    policy: PollPolicy,
    parameters: GenerationParameters,
}

impl std::fmt::Debug for TaskClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskClient")
            .field("transport", &self.transport.transport_name())
            .field("endpoint", &self.transport.endpoint())
            .field("protocol", &self.protocol)
            .field("policy", &self.policy)
            .finish()
    }
}

impl TaskClient {
    /// Create a client over any transport, with default polling and sampling
    ///
    /// Fails with [`ClientError::InvalidInput`] for an empty pending marker.
    pub fn new(
        transport: Arc<dyn GenerationTransport>,
        protocol: StatusProtocol,
    ) -> ClientResult<Self> {
        protocol.validate()?;
        Ok(Self {
            transport,
            protocol,
            policy: PollPolicy::default(),
            parameters: GenerationParameters::default(),
        })
    }

    /// Create a REST-backed client from configuration
    ///
    /// ```rust
    /// use textgen_client::{ClientConfig, TaskClient};
    ///
    /// let client = TaskClient::from_config(&ClientConfig::default()).unwrap();
    /// assert_eq!(client.transport_name(), "rest");
    /// ```
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        config.validate()?;
        let transport = RestGenerationTransport::new(config.service.clone())?;

        Ok(Self::new(Arc::new(transport), config.polling.status_protocol())?
            .with_poll_policy(config.polling.poll_policy())
            .with_parameters(config.generation))
    }

    /// Poll policy used by [`TaskClient::generate`]
    #[must_use]
    pub fn with_poll_policy(mut self, policy: PollPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sampling parameters used by [`TaskClient::generate`]
    #[must_use]
    pub fn with_parameters(mut self, parameters: GenerationParameters) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn transport_name(&self) -> &'static str {
        self.transport.transport_name()
    }

    pub fn endpoint(&self) -> &str {
        self.transport.endpoint()
    }

    pub fn poll_policy(&self) -> &PollPolicy {
        &self.policy
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }

    /// Submit a generation request
    ///
    /// The request is validated before anything is sent; an empty prompt
    /// never reaches the network.
    pub async fn submit(&self, request: &GenerationRequest) -> ClientResult<TaskHandle> {
        request.validate()?;

        let handle = self.transport.submit(request).await.inspect_err(|e| {
            log_error("task_client", "submit", &e.to_string(), Some(self.endpoint()));
        })?;

        log_task_operation("submit", Some(handle.task_id()), "accepted", None, None);
        Ok(handle)
    }

    /// Issue a single status query for a task
    pub async fn poll(&self, handle: &TaskHandle) -> ClientResult<TaskStatus> {
        let body = self.transport.fetch_status(handle).await?;
        let status = self.protocol.classify(&body)?;
        debug!(task_id = %handle, pending = status.is_pending(), "Polled task status");
        Ok(status)
    }

    /// Wait until the task leaves the pending state or `timeout` elapses
    ///
    /// The handle is consumed: once it has produced a terminal status it
    /// cannot be polled again through this call chain.
    pub async fn await_result(
        &self,
        handle: TaskHandle,
        poll_interval: Duration,
        timeout: Duration,
    ) -> ClientResult<String> {
        self.await_result_with_cancel(handle, poll_interval, timeout, &CancelSignal::new())
            .await
    }

    /// Like [`TaskClient::await_result`], but gives up with
    /// [`ClientError::Cancelled`] as soon as `cancel` fires between polls.
    pub async fn await_result_with_cancel(
        &self,
        handle: TaskHandle,
        poll_interval: Duration,
        timeout: Duration,
        cancel: &CancelSignal,
    ) -> ClientResult<String> {
        let policy = PollPolicy::new(poll_interval, timeout);
        policy.validate()?;

        let started = Instant::now();
        let deadline = started.checked_add(timeout);
        let mut polls: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(self.cancelled(&handle, polls));
            }

            let next_poll_at = Instant::now().checked_add(poll_interval);
            let within_budget = match (next_poll_at, deadline) {
                (Some(next), Some(deadline)) => next <= deadline,
                (Some(_), None) => true,
                (None, _) => false,
            };
            let Some(next_poll_at) = next_poll_at.filter(|_| within_budget) else {
                let waited_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
                warn!(
                    task_id = %handle,
                    polls = polls,
                    max_polls = policy.max_polls(),
                    waited_ms = waited_ms,
                    "Gave up waiting for generation task"
                );
                log_task_operation("await", Some(handle.task_id()), "timeout", Some(polls), None);
                return Err(ClientError::Timeout {
                    task_id: handle.task_id().to_string(),
                    polls,
                    waited_ms,
                });
            };

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    return Err(self.cancelled(&handle, polls));
                }
                _ = tokio::time::sleep_until(next_poll_at) => {}
            }

            polls += 1;
            match self.poll(&handle).await? {
                TaskStatus::Pending => continue,
                TaskStatus::Completed(result) => {
                    info!(
                        task_id = %handle,
                        polls = polls,
                        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                        "Generation task completed"
                    );
                    log_task_operation("await", Some(handle.task_id()), "completed", Some(polls), None);
                    return Ok(result);
                }
                TaskStatus::Failed(reason) => {
                    log_task_operation(
                        "await",
                        Some(handle.task_id()),
                        "failed",
                        Some(polls),
                        Some(&reason),
                    );
                    return Err(ClientError::TaskFailed {
                        task_id: handle.task_id().to_string(),
                        reason,
                    });
                }
            }
        }
    }

    /// Submit `prompt` with the client's parameters and wait for the answer
    pub async fn generate(&self, prompt: &str) -> ClientResult<String> {
        self.generate_with_cancel(prompt, &CancelSignal::new()).await
    }

    pub async fn generate_with_cancel(
        &self,
        prompt: &str,
        cancel: &CancelSignal,
    ) -> ClientResult<String> {
        let request = GenerationRequest::with_parameters(prompt, self.parameters);
        let handle = self.submit(&request).await?;
        self.await_result_with_cancel(
            handle,
            self.policy.poll_interval,
            self.policy.timeout,
            cancel,
        )
        .await
    }

    fn cancelled(&self, handle: &TaskHandle, polls: u32) -> ClientError {
        info!(task_id = %handle, polls = polls, "Wait for generation task cancelled");
        log_task_operation("await", Some(handle.task_id()), "cancelled", Some(polls), None);
        ClientError::Cancelled {
            task_id: handle.task_id().to_string(),
            polls,
        }
    }
}
