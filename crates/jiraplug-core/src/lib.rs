//! JiraPlug core
//!
//! Configuration model and loading, plus helpers shared by the Jira client and
//! the daemon.

pub mod de;
pub mod error;
pub mod models;
pub mod storage;

pub use error::{Error, Result};
