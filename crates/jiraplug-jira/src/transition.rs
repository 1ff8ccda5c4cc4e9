//! Workflow status transitions
//!
//! Jira does not let a client set `status` directly; the issue has to follow
//! one of the transitions available from its current status. The candidates
//! are fetched fresh on every attempt and scanned in server order.

use reqwest::Method;

use crate::client::JiraClient;
use crate::error::{Error, Result};
use crate::field::eq_ignore_case;
use crate::types::{IssueKey, JiraStatus, JiraTransition, JiraTransitionAction, JiraTransitions};

/// True when the status is named `requested`, or failing that, belongs to a
/// status category named `requested` (case-insensitive both ways).
pub fn is_target_status(status: &JiraStatus, requested: &str) -> bool {
    if eq_ignore_case(&status.name, requested) {
        return true;
    }

    status
        .status_category
        .as_ref()
        .map(|category| eq_ignore_case(&category.name, requested))
        .unwrap_or(false)
}

/// First candidate, in the given order, whose target status matches.
pub fn select_transition<'a>(
    candidates: &'a [JiraTransition],
    requested: &str,
) -> Option<&'a JiraTransition> {
    candidates.iter().find(|transition| {
        transition
            .to
            .as_ref()
            .map(|status| is_target_status(status, requested))
            .unwrap_or(false)
    })
}

impl JiraClient {
    /// `GET issue/{key}/transitions`.
    pub async fn available_transitions(&self, issue_key: &IssueKey) -> Result<Vec<JiraTransition>> {
        let result = async {
            let uri = self.rest_uri(&format!("issue/{}/transitions", issue_key))?;
            tracing::debug!("Retrieving list of transitions: {}", uri);

            let request = self.authenticated_request(uri, Method::GET);
            let response = self.execute(request).await?;
            let parsed: JiraTransitions = serde_json::from_str(&response)?;
            Ok::<_, Error>(parsed.transitions)
        }
        .await;

        result.map_err(|e| Error::TransitionsFetch {
            issue_key: issue_key.to_string(),
            source: Box::new(e),
        })
    }

    /// Resolve the transition leading to `new_status` and apply it.
    ///
    /// Returns the transition that was posted.
    pub async fn transition_status(
        &self,
        issue_key: &IssueKey,
        new_status: &str,
    ) -> Result<JiraTransition> {
        let candidates = self.available_transitions(issue_key).await?;

        let transition = select_transition(&candidates, new_status)
            .cloned()
            .ok_or_else(|| Error::NoMatchingTransition {
                status: new_status.to_string(),
                issue_key: issue_key.to_string(),
            })?;

        tracing::debug!(
            "Applying transition [{}] ({}) to issue {}",
            transition.name,
            transition.id,
            issue_key
        );

        let result = async {
            let uri = self.rest_uri(&format!("issue/{}/transitions", issue_key))?;
            let request =
                self.write_request(uri, Method::POST, &JiraTransitionAction::new(&transition))?;
            self.execute(request).await
        }
        .await;

        match result {
            Ok(_) => Ok(transition),
            Err(e) => Err(Error::TransitionPost {
                transition: transition.name,
                issue_key: issue_key.to_string(),
                source: Box::new(e),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JiraStatusCategory;

    fn candidate(id: &str, status: &str, category: &str) -> JiraTransition {
        JiraTransition {
            id: id.to_string(),
            name: format!("To {}", status),
            to: Some(JiraStatus {
                name: status.to_string(),
                status_category: Some(JiraStatusCategory {
                    name: category.to_string(),
                }),
            }),
        }
    }

    fn workflow() -> Vec<JiraTransition> {
        vec![candidate("11", "Open", "To Do"), candidate("31", "Done", "Done")]
    }

    #[test]
    fn test_matches_name_case_insensitively() {
        let candidates = workflow();
        let selected = select_transition(&candidates, "done").unwrap();
        assert_eq!(selected.id, "31");
    }

    #[test]
    fn test_matches_first_candidate_by_category() {
        let candidates = workflow();
        let selected = select_transition(&candidates, "To Do").unwrap();
        assert_eq!(selected.id, "11");
    }

    #[test]
    fn test_category_fallback() {
        let candidates = vec![candidate("11", "Open", "To Do")];
        let selected = select_transition(&candidates, "to do").unwrap();
        assert_eq!(selected.id, "11");
    }

    #[test]
    fn test_first_match_in_server_order_wins() {
        // The category match on the first candidate shadows the exact name
        // match further down.
        let candidates = vec![
            candidate("21", "Resolved", "Done"),
            candidate("31", "Done", "Done"),
        ];
        assert_eq!(select_transition(&candidates, "Done").unwrap().id, "21");
    }

    #[test]
    fn test_no_match() {
        let candidates = workflow();
        assert!(select_transition(&candidates, "In Review").is_none());
        assert!(select_transition(&[], "Done").is_none());
    }

    #[test]
    fn test_candidates_without_target_are_skipped() {
        let mut candidates = workflow();
        candidates.insert(
            0,
            JiraTransition {
                id: "1".to_string(),
                name: "Broken".to_string(),
                to: None,
            },
        );
        candidates.insert(
            1,
            JiraTransition {
                id: "2".to_string(),
                name: "No category".to_string(),
                to: Some(JiraStatus {
                    name: "Open".to_string(),
                    status_category: None,
                }),
            },
        );

        assert_eq!(select_transition(&candidates, "to do").unwrap().id, "11");
        assert_eq!(select_transition(&candidates, "open").unwrap().id, "2");
    }
}
