//! # Text Generator Trait
//!
//! The LLM-shaped interface retrieval chains call into. A generator takes a
//! fully rendered prompt and returns the completion text; how the text is
//! produced (here, a remote task that is polled to completion) stays behind
//! the trait.

use async_trait::async_trait;

use crate::client::TaskClient;
use crate::error::{ClientError, ClientResult};
use crate::models::GenerationParameters;

/// Something that turns a prompt into completion text
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Short identifier of the generator kind, for logs and chain metadata
    fn generator_type(&self) -> &'static str;

    /// Parameters that distinguish this generator's output
    fn identifying_params(&self) -> &GenerationParameters;

    /// Complete a prompt.
    ///
    /// Generators that cannot honour stop sequences must reject them rather
    /// than silently ignore them.
    async fn complete(&self, prompt: &str, stop: Option<&[String]>) -> ClientResult<String>;
}

#[async_trait]
impl TextGenerator for TaskClient {
    fn generator_type(&self) -> &'static str {
        "remote_task"
    }

    fn identifying_params(&self) -> &GenerationParameters {
        self.parameters()
    }

    async fn complete(&self, prompt: &str, stop: Option<&[String]>) -> ClientResult<String> {
        if stop.is_some() {
            return Err(ClientError::invalid_input(
                "stop sequences are not supported by the remote generation service",
            ));
        }
        self.generate(prompt).await
    }
}
