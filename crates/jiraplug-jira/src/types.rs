//! JIRA API types

use jiraplug_core::de::string_or_number;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical issue identifier, `PROJECT-NUMBER`. Neither part is validated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IssueKey(String);

impl IssueKey {
    pub fn new(project_key: &str, issue_number: &str) -> Self {
        Self(format!("{}-{}", project_key, issue_number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IssueKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Body of `GET issue/{key}?fields=...`, narrowed to the field map.
#[derive(Debug, Clone, Deserialize)]
pub struct JiraIssueFields {
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Body of `GET issue/{key}/transitions`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JiraTransitions {
    #[serde(default)]
    pub transitions: Vec<JiraTransition>,
}

/// One workflow transition available from the issue's current status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JiraTransition {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub to: Option<JiraStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JiraStatus {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "statusCategory", default)]
    pub status_category: Option<JiraStatusCategory>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JiraStatusCategory {
    #[serde(default)]
    pub name: String,
}

/// Body of `POST issue/{key}/transitions`.
#[derive(Debug, Clone, Serialize)]
pub struct JiraTransitionAction {
    pub transition: JiraTransitionId,
}

#[derive(Debug, Clone, Serialize)]
pub struct JiraTransitionId {
    pub id: String,
}

impl JiraTransitionAction {
    pub fn new(transition: &JiraTransition) -> Self {
        Self {
            transition: JiraTransitionId {
                id: transition.id.clone(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_issue_key() {
        assert_eq!(IssueKey::new("PRJ", "42").as_str(), "PRJ-42");
        assert_eq!(IssueKey::new("prj", " 7").to_string(), "prj- 7");
        assert_eq!(IssueKey::new("", "").as_str(), "-");
    }

    #[test]
    fn test_deserialize_transitions() {
        let body = json!({
            "expand": "transitions",
            "transitions": [
                {
                    "id": "11",
                    "name": "Start Progress",
                    "to": {
                        "id": "3",
                        "name": "In Progress",
                        "statusCategory": { "id": 4, "key": "indeterminate", "name": "In Progress" }
                    }
                },
                { "id": 21, "name": "Orphan" }
            ]
        });

        let parsed: JiraTransitions = serde_json::from_value(body).unwrap();
        assert_eq!(parsed.transitions.len(), 2);
        assert_eq!(parsed.transitions[0].id, "11");
        let to = parsed.transitions[0].to.as_ref().unwrap();
        assert_eq!(to.name, "In Progress");
        assert_eq!(to.status_category.as_ref().unwrap().name, "In Progress");
        assert_eq!(parsed.transitions[1].id, "21");
        assert!(parsed.transitions[1].to.is_none());
    }

    #[test]
    fn test_transition_action_body() {
        let transition = JiraTransition {
            id: "31".to_string(),
            name: "Done".to_string(),
            to: None,
        };
        let body = serde_json::to_value(JiraTransitionAction::new(&transition)).unwrap();
        assert_eq!(body, json!({ "transition": { "id": "31" } }));
    }
}
