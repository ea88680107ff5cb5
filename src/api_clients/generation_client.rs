//! # Generation API Client
//!
//! HTTP transport for the remote text-generation service.
//!
//! - `POST {base_url}{generate_path}` with `{"prompt": ...}` returns `{"task_id": ...}`
//! - `GET {base_url}{status_path}{task_id}` returns the task's status body

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error, info};

use crate::config::ServiceConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{GenerationRequest, TaskHandle};
use crate::transport::GenerationTransport;

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    task_id: Option<serde_json::Value>,
}

/// REST transport for the generation service
#[derive(Clone)]
pub struct RestGenerationTransport {
    client: Client,
    config: ServiceConfig,
    generate_url: Url,
    status_url: Url,
}

impl std::fmt::Debug for RestGenerationTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestGenerationTransport")
            .field("base_url", &self.config.base_url)
            .field("generate_url", &self.generate_url.as_str())
            .field("timeout_ms", &self.config.timeout_ms)
            .field("auth_enabled", &self.config.auth_token.is_some())
            .finish()
    }
}

impl RestGenerationTransport {
    /// Create a new transport with the given service configuration
    ///
    /// Validates the base URL and endpoint paths up front and prepares an
    /// HTTP client with the configured timeout and authentication header.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use textgen_client::api_clients::RestGenerationTransport;
    /// use textgen_client::config::ServiceConfig;
    ///
    /// let transport = RestGenerationTransport::new(ServiceConfig {
    ///     base_url: "http://localhost:8000".to_string(),
    ///     ..Default::default()
    /// })
    /// .unwrap();
    /// assert_eq!(transport.base_url(), "http://localhost:8000");
    /// ```
    pub fn new(config: ServiceConfig) -> ClientResult<Self> {
        let mut base_url = Url::parse(&config.base_url).map_err(|e| {
            ClientError::config_error(format!("Invalid base URL '{}': {}", config.base_url, e))
        })?;
        // Endpoint paths are appended to any prefix the base URL already carries
        if !base_url.path().ends_with('/') {
            let prefixed = format!("{}/", base_url.path());
            base_url.set_path(&prefixed);
        }
        let generate_url = base_url
            .join(config.generate_path.trim_start_matches('/'))
            .map_err(|e| {
                ClientError::config_error(format!("Failed to construct generate URL: {}", e))
            })?;
        let status_url = base_url
            .join(config.status_path.trim_start_matches('/'))
            .map_err(|e| {
                ClientError::config_error(format!("Failed to construct status URL: {}", e))
            })?;
        if status_url.cannot_be_a_base() {
            return Err(ClientError::config_error(format!(
                "Status URL cannot take a task id segment: {}",
                status_url
            )));
        }

        let mut client_builder = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .user_agent(format!("textgen-client/{}", env!("CARGO_PKG_VERSION")));

        if let Some(token) = config.auth_token.as_deref().filter(|t| !t.is_empty()) {
            let mut default_headers = reqwest::header::HeaderMap::new();
            default_headers.insert(
                reqwest::header::AUTHORIZATION,
                format!("Bearer {}", token).parse().map_err(|e| {
                    ClientError::config_error(format!("Invalid bearer token: {}", e))
                })?,
            );
            client_builder = client_builder.default_headers(default_headers);
            debug!("Configured Bearer token authentication");
        }

        let client = client_builder.build().map_err(|e| {
            ClientError::config_error(format!("Failed to create HTTP client: {}", e))
        })?;

        info!(
            base_url = %config.base_url,
            timeout_ms = config.timeout_ms,
            auth_enabled = config.auth_token.is_some(),
            "Created generation API client"
        );

        Ok(Self {
            client,
            config,
            generate_url,
            status_url,
        })
    }

    /// Get the configured base URL for debugging/logging
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Get the configured timeout for debugging/logging
    #[must_use]
    pub fn timeout_ms(&self) -> u64 {
        self.config.timeout_ms
    }

    /// Status URL for a task, with the id percent-encoded as one path segment
    pub fn status_url_for(&self, handle: &TaskHandle) -> ClientResult<Url> {
        let mut url = self.status_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::config_error("Status URL cannot be a base"))?
            .pop_if_empty()
            .push(handle.task_id());
        Ok(url)
    }

    /// Turn a non-success response into an API error
    async fn error_from_response(response: reqwest::Response, operation: &str) -> ClientError {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        error!(status = %status, error = %error_text, "Failed operation: {}", operation);
        ClientError::api_error(status.as_u16(), error_text)
    }
}

#[async_trait]
impl GenerationTransport for RestGenerationTransport {
    fn transport_name(&self) -> &'static str {
        "rest"
    }

    fn endpoint(&self) -> &str {
        &self.config.base_url
    }

    async fn submit(&self, request: &GenerationRequest) -> ClientResult<TaskHandle> {
        let body = request.to_body(self.config.include_parameters);

        debug!(
            url = %self.generate_url,
            prompt_len = request.prompt().len(),
            "Submitting generation request"
        );

        let response = self
            .client
            .post(self.generate_url.clone())
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "submit generation").await);
        }

        let submitted = response.json::<SubmitResponse>().await.map_err(|e| {
            ClientError::invalid_response("task_id", format!("Failed to parse response: {}", e))
        })?;

        match submitted.task_id {
            Some(serde_json::Value::String(task_id)) if !task_id.is_empty() => {
                debug!(task_id = %task_id, "Generation task accepted");
                Ok(TaskHandle::new(task_id))
            }
            Some(serde_json::Value::String(_)) => Err(ClientError::invalid_response(
                "task_id",
                "empty task identifier",
            )),
            Some(other) => Err(ClientError::invalid_response(
                "task_id",
                format!("expected a string, got {}", other),
            )),
            None => Err(ClientError::invalid_response(
                "task_id",
                "missing from generate response",
            )),
        }
    }

    async fn fetch_status(&self, handle: &TaskHandle) -> ClientResult<String> {
        let url = self.status_url_for(handle)?;

        debug!(url = %url, task_id = %handle, "Fetching task status");

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_from_response(response, "fetch task status").await);
        }

        Ok(response.text().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transport() -> RestGenerationTransport {
        RestGenerationTransport::new(ServiceConfig::default()).unwrap()
    }

    #[test]
    fn test_transport_creation() {
        let transport = transport();
        assert_eq!(transport.base_url(), "http://fastapi:80");
        assert_eq!(transport.timeout_ms(), 30000);
        assert_eq!(transport.transport_name(), "rest");
    }

    #[test]
    fn test_generate_url_construction() {
        let transport = transport();
        assert_eq!(
            transport.generate_url.as_str(),
            "http://fastapi/generateText/"
        );
    }

    #[test]
    fn test_status_url_construction() {
        let transport = transport();
        let url = transport
            .status_url_for(&TaskHandle::new("1f0e-42"))
            .unwrap();
        assert_eq!(url.as_str(), "http://fastapi/task/1f0e-42");
    }

    #[test]
    fn test_status_url_escapes_task_id() {
        let transport = transport();
        let url = transport
            .status_url_for(&TaskHandle::new("a/b c"))
            .unwrap();
        assert_eq!(url.as_str(), "http://fastapi/task/a%2Fb%20c");
    }

    #[test]
    fn test_status_path_without_trailing_slash() {
        let transport = RestGenerationTransport::new(ServiceConfig {
            base_url: "http://localhost:8000".to_string(),
            status_path: "/v1/status".to_string(),
            ..Default::default()
        })
        .unwrap();
        let url = transport.status_url_for(&TaskHandle::new("xyz")).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/v1/status/xyz");
    }

    #[test]
    fn test_base_url_path_prefix_is_kept() {
        for base_url in ["http://gateway:8080/llm", "http://gateway:8080/llm/"] {
            let transport = RestGenerationTransport::new(ServiceConfig {
                base_url: base_url.to_string(),
                ..Default::default()
            })
            .unwrap();
            assert_eq!(
                transport.generate_url.as_str(),
                "http://gateway:8080/llm/generateText/"
            );
            let url = transport.status_url_for(&TaskHandle::new("abc")).unwrap();
            assert_eq!(url.as_str(), "http://gateway:8080/llm/task/abc");
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let result = RestGenerationTransport::new(ServiceConfig {
            base_url: "::not a url::".to_string(),
            ..Default::default()
        });
        assert!(matches!(result, Err(ClientError::ConfigError(_))));
    }

    #[test]
    fn test_debug_hides_token() {
        let transport = RestGenerationTransport::new(ServiceConfig {
            auth_token: Some("super-secret".to_string()),
            ..Default::default()
        })
        .unwrap();
        let debug = format!("{:?}", transport);
        assert!(debug.contains("auth_enabled: true"));
        assert!(!debug.contains("super-secret"));
    }
}
