//! Orchestration server communication

pub mod client;
pub mod protocol;

pub use client::{PlugClient, PlugClientError, PlugConfig};
pub use protocol::{Action, Outcome, PlugMessage, RequestEnvelope, ResponseEnvelope};
