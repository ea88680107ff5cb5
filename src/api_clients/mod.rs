//! API Client Modules
//!
//! HTTP transports for communicating with the remote generation service.

pub mod generation_client;

pub use generation_client::RestGenerationTransport;
