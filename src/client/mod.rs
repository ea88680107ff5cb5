//! # Generation Task Client
//!
//! The caller-facing side of the crate:
//!
//! - **TaskClient**: submit a prompt, poll its task, wait for the result
//! - **TextGenerator**: the prompt-in, text-out interface retrieval chains use
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use textgen_client::{ClientConfig, GenerationRequest, TaskClient};
//!
//! # async fn example() -> textgen_client::ClientResult<()> {
//! let client = TaskClient::from_config(&ClientConfig::load()?)?;
//!
//! let handle = client
//!     .submit(&GenerationRequest::new("Summarize the attached context."))
//!     .await?;
//! let answer = client
//!     .await_result(handle, Duration::from_secs(2), Duration::from_secs(120))
//!     .await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod task_client;
pub mod traits;

pub use task_client::TaskClient;
pub use traits::TextGenerator;
