use jiraplug_core::de::{string_or_number, strings_or_numbers};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{ApiError, Result};

/// One inbound message: correlation id, lower-cased action name and the raw
/// JSON the action payload is decoded from.
#[derive(Debug, Clone)]
pub struct RequestEnvelope {
    pub request_id: String,
    pub action: String,
    pub payload: Value,
}

impl RequestEnvelope {
    /// Fails only on malformed JSON. A missing or non-scalar `requestId` or
    /// `action` reads as the empty string.
    pub fn parse(text: &str) -> std::result::Result<Self, serde_json::Error> {
        let payload: Value = serde_json::from_str(text)?;

        Ok(Self {
            request_id: read_property(&payload, "requestId"),
            action: read_property(&payload, "action").to_lowercase(),
            payload,
        })
    }

    /// Decode the action-specific payload.
    pub fn decode(&self) -> Result<Action> {
        let action = match self.action.as_str() {
            "getissueurl" => Action::GetIssueUrl(self.params()?),
            "getfieldvalue" => Action::GetFieldValue(self.params()?),
            "setfieldvalue" => Action::SetFieldValue(self.params()?),
            "createrelease" => Action::CreateRelease(self.lenient_params()),
            "getreleasetasks" => Action::GetReleaseTasks(self.lenient_params()),
            other => return Err(ApiError::UnsupportedAction(other.to_string())),
        };
        Ok(action)
    }

    fn params<T>(&self) -> Result<T>
    where
        T: for<'de> Deserialize<'de>,
    {
        T::deserialize(&self.payload).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Payloads of actions that ignore their contents fall back to defaults
    /// so the reply still names the action.
    fn lenient_params<T>(&self) -> T
    where
        T: for<'de> Deserialize<'de> + Default,
    {
        self.params().unwrap_or_else(|e| {
            tracing::debug!("Ignoring unreadable '{}' payload: {}", self.action, e);
            T::default()
        })
    }
}

fn read_property(payload: &Value, name: &str) -> String {
    match payload.get(name) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Issue tracker actions understood by the plug.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    GetIssueUrl(IssueParams),
    GetFieldValue(GetFieldValueParams),
    SetFieldValue(SetFieldValueParams),
    CreateRelease(CreateReleaseParams),
    GetReleaseTasks(GetReleaseTasksParams),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueParams {
    pub project_key: String,
    #[serde(deserialize_with = "string_or_number")]
    pub task_number: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetFieldValueParams {
    #[serde(flatten)]
    pub issue: IssueParams,
    pub field_name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFieldValueParams {
    #[serde(flatten)]
    pub issue: IssueParams,
    pub field_name: String,
    #[serde(default)]
    pub new_value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateReleaseParams {
    pub release_name: Option<String>,
    pub release_comment: Option<String>,
    pub project_key: Option<String>,
    #[serde(deserialize_with = "strings_or_numbers")]
    pub task_numbers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GetReleaseTasksParams {
    pub project_key: Option<String>,
    pub release_name: Option<String>,
}

/// Successful result of an action, before it is wrapped in an envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `{requestId, value}`; `None` serializes as `null`.
    Value(Option<String>),
    /// `{requestId}`.
    Done,
    /// `{requestId, tasks}`.
    Tasks(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseEnvelope {
    #[serde(rename = "requestId")]
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ResponseEnvelope {
    fn empty(request_id: String) -> Self {
        Self {
            request_id,
            value: None,
            tasks: None,
            error: None,
        }
    }

    pub fn success(request_id: String) -> Self {
        Self::empty(request_id)
    }

    pub fn value(request_id: String, value: Option<String>) -> Self {
        Self {
            value: Some(value.map(Value::String).unwrap_or(Value::Null)),
            ..Self::empty(request_id)
        }
    }

    pub fn tasks(request_id: String, tasks: Vec<String>) -> Self {
        Self {
            tasks: Some(tasks),
            ..Self::empty(request_id)
        }
    }

    pub fn error(request_id: String, message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::empty(request_id)
        }
    }

    pub fn from_outcome(request_id: String, outcome: Outcome) -> Self {
        match outcome {
            Outcome::Value(value) => Self::value(request_id, value),
            Outcome::Done => Self::success(request_id),
            Outcome::Tasks(tasks) => Self::tasks(request_id, tasks),
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Messages the plug sends on its own behalf after connecting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum PlugMessage {
    Login {
        key: String,
    },
    Register {
        #[serde(rename = "type")]
        plug_type: String,
        name: String,
    },
}

impl PlugMessage {
    pub fn login(api_key: impl Into<String>) -> Self {
        PlugMessage::Login {
            key: api_key.into(),
        }
    }

    pub fn register(plug_type: impl Into<String>, name: impl Into<String>) -> Self {
        PlugMessage::Register {
            plug_type: plug_type.into(),
            name: name.into(),
        }
    }
}
