#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Textgen Client
//!
//! Asynchronous task client for remote text-generation services, plus the
//! citation bookkeeping a retrieval-augmented question answering app needs.
//!
//! ## Overview
//!
//! Generation services that run on a worker queue do not answer a prompt
//! directly. They accept it, hand back a task id, and expose a status endpoint
//! that reports "still pending" until the worker is done and then returns the
//! generated text. This crate wraps that protocol:
//!
//! - [`TaskClient::submit`] validates and posts a [`GenerationRequest`]
//! - [`TaskClient::poll`] issues one status query
//! - [`TaskClient::await_result`] polls at a fixed interval until the task
//!   finishes, the time budget runs out, or a [`CancelSignal`] fires
//!
//! [`citations::aggregate`] groups the source fragments a retriever returned
//! for an answer into one citation per document.
//!
//! ## Module Organization
//!
//! - [`client`] - Task client and the [`TextGenerator`] interface
//! - [`api_clients`] - REST transport for the generation service
//! - [`transport`] - Transport trait the client is written against
//! - [`models`] - Requests, handles, statuses and poll policy
//! - [`citations`] - Source citation aggregation
//! - [`config`] - Configuration loading
//! - [`logging`] - Structured logging setup
//! - [`error`] - Structured error handling
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use textgen_client::{logging, ClientConfig, TaskClient};
//!
//! # async fn example() -> textgen_client::ClientResult<()> {
//! let config = ClientConfig::load()?;
//! logging::init_structured_logging(&config.logging);
//!
//! let client = TaskClient::from_config(&config)?;
//! let answer = client.generate("What problem does the paper solve?").await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod api_clients;
pub mod cancel;
pub mod citations;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod transport;

// Re-export commonly used types for convenience
pub use api_clients::RestGenerationTransport;
pub use cancel::CancelSignal;
pub use citations::{aggregate, Citation, SourceFragment, SourcedAnswer};
pub use client::{TaskClient, TextGenerator};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use models::{
    GenerationParameters, GenerationRequest, PollPolicy, StatusProtocol, TaskHandle, TaskStatus,
};
pub use transport::GenerationTransport;
