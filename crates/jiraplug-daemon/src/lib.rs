//! JiraPlug Daemon Library
//!
//! Action dispatch and orchestration server transport, exposed as a library
//! for testing.

pub mod api;
pub mod ipc;

pub use api::{ApiError, ApiHandler};
pub use ipc::{Action, Outcome, PlugClient, PlugConfig, RequestEnvelope, ResponseEnvelope};
