//! Data types exchanged with the generation service.

pub mod generation;
pub mod task;

pub use generation::{GenerationParameters, GenerationRequest};
pub use task::{
    decode_status_text, PollPolicy, StatusProtocol, TaskHandle, TaskStatus,
    DEFAULT_PENDING_MARKER,
};
