//! Error types for JIRA integration

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid Jira URL [{url}]: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Jira responded with status {status}")]
    Rejected { status: u16 },

    #[error("Json property [{path}] not found in the response")]
    FieldPath { path: String },

    #[error(
        "Could not get the issue field [{field}] from issue key [{issue_key}]. \
         Jira server:[{server}]. Error:{source}"
    )]
    FieldRead {
        field: String,
        issue_key: String,
        server: String,
        source: Box<Error>,
    },

    #[error(
        "Could not update issue field [{field}] from issue key [{issue_key}]. \
         Jira server:[{server}]. Error:{source}"
    )]
    FieldUpdate {
        field: String,
        issue_key: String,
        server: String,
        source: Box<Error>,
    },

    #[error("Could not retrieve the transitions for issue [{issue_key}]. Error:{source}")]
    TransitionsFetch { issue_key: String, source: Box<Error> },

    #[error("Unable to find a suitable transition to '{status}' for issue: [{issue_key}]")]
    NoMatchingTransition { status: String, issue_key: String },

    #[error("Unable to post an {transition} transition to issue {issue_key}: {source}")]
    TransitionPost {
        transition: String,
        issue_key: String,
        source: Box<Error>,
    },
}

impl Error {
    /// True when no workflow transition matched, as opposed to a failed
    /// remote call.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(self, Error::NoMatchingTransition { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
