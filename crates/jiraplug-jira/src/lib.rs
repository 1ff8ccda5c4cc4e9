//! JiraPlug Jira Integration
//!
//! Translates issue tracker operations into Jira REST API v2 calls: field
//! reads and writes, workflow transitions and issue page URLs.

pub mod auth;
pub mod client;
pub mod error;
pub mod field;
pub mod transition;
pub mod types;

pub use auth::AccessToken;
pub use client::JiraClient;
pub use error::{Error, Result};
pub use field::FieldUpdate;
pub use types::*;
