//! # Generation Request Model
//!
//! The payload submitted to a remote text-generation service.
//!
//! A [`GenerationRequest`] is immutable once built: the prompt and sampling
//! parameters are only readable through accessors, so the value a caller
//! inspects after `submit` is exactly what went over the wire.

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Sampling parameters sent alongside a prompt.
///
/// Defaults mirror the values the generation service was tuned for:
/// 256 new tokens, nucleus sampling at 0.9 and a near-greedy temperature.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationParameters {
    /// Upper bound on generated tokens
    pub max_new_tokens: u32,
    /// Nucleus sampling probability mass, in (0, 1]
    pub top_p: f32,
    /// Sampling temperature, >= 0
    pub temperature: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self {
            max_new_tokens: 256,
            top_p: 0.9,
            temperature: 0.1,
        }
    }
}

impl GenerationParameters {
    /// Reject parameter combinations no sampler accepts
    pub fn validate(&self) -> ClientResult<()> {
        if self.max_new_tokens == 0 {
            return Err(ClientError::invalid_input(
                "max_new_tokens must be greater than zero",
            ));
        }
        if self.top_p.is_nan() || self.top_p <= 0.0 || self.top_p > 1.0 {
            return Err(ClientError::invalid_input(format!(
                "top_p must be in (0, 1], got {}",
                self.top_p
            )));
        }
        if self.temperature.is_nan() || self.temperature < 0.0 {
            return Err(ClientError::invalid_input(format!(
                "temperature must be non-negative, got {}",
                self.temperature
            )));
        }
        Ok(())
    }
}

/// A prompt plus the parameters it should be generated with.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    prompt: String,
    parameters: GenerationParameters,
}

impl GenerationRequest {
    /// Build a request with default sampling parameters
    pub fn new(prompt: impl Into<String>) -> Self {
        Self::with_parameters(prompt, GenerationParameters::default())
    }

    pub fn with_parameters(prompt: impl Into<String>, parameters: GenerationParameters) -> Self {
        Self {
            prompt: prompt.into(),
            parameters,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn parameters(&self) -> &GenerationParameters {
        &self.parameters
    }

    /// Check the request before it is allowed anywhere near the network.
    ///
    /// A prompt consisting only of whitespace is treated as empty.
    pub fn validate(&self) -> ClientResult<()> {
        if self.prompt.trim().is_empty() {
            return Err(ClientError::invalid_input("prompt must not be empty"));
        }
        self.parameters.validate()
    }

    /// JSON body for the generate endpoint.
    ///
    /// The service only requires `prompt`; sampling parameters are added as
    /// top-level fields when `include_parameters` is set.
    pub fn to_body(&self, include_parameters: bool) -> serde_json::Value {
        let mut body = serde_json::json!({ "prompt": self.prompt });
        if include_parameters {
            body["max_new_tokens"] = self.parameters.max_new_tokens.into();
            body["top_p"] = f64::from(self.parameters.top_p).into();
            body["temperature"] = f64::from(self.parameters.temperature).into();
        }
        body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = GenerationParameters::default();
        assert_eq!(params.max_new_tokens, 256);
        assert!((params.top_p - 0.9).abs() < f32::EPSILON);
        assert!((params.temperature - 0.1).abs() < f32::EPSILON);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_empty_prompt_rejected() {
        assert!(matches!(
            GenerationRequest::new("").validate(),
            Err(ClientError::InvalidInput(_))
        ));
        assert!(matches!(
            GenerationRequest::new("  \n\t").validate(),
            Err(ClientError::InvalidInput(_))
        ));
        assert!(GenerationRequest::new("What is attention?").validate().is_ok());
    }

    #[test]
    fn test_invalid_parameters_rejected() {
        let params = GenerationParameters {
            top_p: 1.5,
            ..Default::default()
        };
        assert!(GenerationRequest::with_parameters("hi", params)
            .validate()
            .is_err());

        let params = GenerationParameters {
            temperature: -0.5,
            ..Default::default()
        };
        assert!(params.validate().is_err());

        let params = GenerationParameters {
            temperature: f32::NAN,
            ..Default::default()
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_body_contains_only_prompt_by_default() {
        let body = GenerationRequest::new("hello").to_body(false);
        assert_eq!(body, serde_json::json!({ "prompt": "hello" }));
    }

    #[test]
    fn test_body_with_parameters() {
        let body = GenerationRequest::new("hello").to_body(true);
        assert_eq!(body["prompt"], "hello");
        assert_eq!(body["max_new_tokens"], 256);
        assert!(body["top_p"].as_f64().is_some());
        assert!(body["temperature"].as_f64().is_some());
    }
}
