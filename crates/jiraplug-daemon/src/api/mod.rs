//! API handlers

pub mod issue;
pub mod release;

use std::sync::Arc;
use tracing::Instrument;

use jiraplug_jira::JiraClient;

use crate::ipc::{Action, Outcome, RequestEnvelope, ResponseEnvelope};

/// API error
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Invalid message: {0}")]
    Decode(String),

    #[error("The issue tracker plug action '{0}' is not supported")]
    UnsupportedAction(String),

    #[error("The '{0}' action is not implemented yet")]
    NotImplemented(&'static str),

    #[error(transparent)]
    Jira(#[from] jiraplug_jira::Error),

    #[error("Message handler aborted: {0}")]
    Aborted(String),
}

pub type Result<T> = std::result::Result<T, ApiError>;

/// Routes decoded actions to their handlers. Holds only the shared, read-only
/// Jira client; all other state is per message.
pub struct ApiHandler {
    jira: Arc<JiraClient>,
}

impl ApiHandler {
    pub fn new(jira: Arc<JiraClient>) -> Self {
        Self { jira }
    }

    pub async fn handle(&self, action: Action) -> Result<Outcome> {
        match action {
            Action::GetIssueUrl(params) => issue::get_issue_url(&self.jira, params),
            Action::GetFieldValue(params) => issue::get_field_value(&self.jira, params).await,
            Action::SetFieldValue(params) => issue::set_field_value(&self.jira, params).await,
            Action::CreateRelease(params) => release::create_release(params),
            Action::GetReleaseTasks(params) => release::get_release_tasks(params),
        }
    }

    /// Decode, handle and answer one envelope. Every failure becomes an error
    /// envelope carrying the request's `requestId`.
    pub async fn dispatch(&self, envelope: RequestEnvelope) -> ResponseEnvelope {
        let request_id = envelope.request_id.clone();

        let result = match envelope.decode() {
            Ok(action) => self.handle(action).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                tracing::debug!("Action {} completed", envelope.action);
                ResponseEnvelope::from_outcome(request_id, outcome)
            }
            Err(e) => {
                tracing::error!(
                    "Error processing message {}: \nMessage:{}. Error: {}",
                    envelope.action,
                    envelope.payload,
                    e
                );
                tracing::debug!("Error detail: {:?}", e);
                ResponseEnvelope::error(request_id, e.to_string())
            }
        }
    }

    /// Process one raw inbound message on its own task.
    ///
    /// The message is handled inside a span carrying its `requestId`, so every
    /// log line it produces is correlated. A panicking handler is reported as
    /// an error envelope instead of taking the plug down.
    pub async fn process(self: &Arc<Self>, text: &str) -> ResponseEnvelope {
        let envelope = match RequestEnvelope::parse(text) {
            Ok(envelope) => envelope,
            Err(e) => {
                let err = ApiError::Decode(e.to_string());
                tracing::error!("Error processing message: \nMessage:{}. Error: {}", text, err);
                return ResponseEnvelope::error(String::new(), err.to_string());
            }
        };

        let request_id = envelope.request_id.clone();
        let span = tracing::info_span!(
            "message",
            request_id = %envelope.request_id,
            action = %envelope.action
        );

        let handler = Arc::clone(self);
        let task = tokio::spawn(async move { handler.dispatch(envelope).await }.instrument(span));

        match task.await {
            Ok(response) => response,
            Err(e) => {
                let err = ApiError::Aborted(e.to_string());
                tracing::error!(request_id = %request_id, "Error processing message: {}", err);
                ResponseEnvelope::error(request_id, err.to_string())
            }
        }
    }
}
