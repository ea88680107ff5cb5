pub mod generation_server;

pub use generation_server::*;
