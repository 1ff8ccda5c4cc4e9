use jiraplug_jira::{IssueKey, JiraClient};

use super::Result;
use crate::ipc::protocol::{GetFieldValueParams, IssueParams, SetFieldValueParams};
use crate::ipc::Outcome;

const STATUS_FIELD: &str = "status";

fn issue_key(params: &IssueParams) -> IssueKey {
    IssueKey::new(&params.project_key, &params.task_number)
}

pub fn get_issue_url(jira: &JiraClient, params: IssueParams) -> Result<Outcome> {
    let url = jira.issue_page_url(&issue_key(&params));
    Ok(Outcome::Value(Some(url)))
}

pub async fn get_field_value(jira: &JiraClient, params: GetFieldValueParams) -> Result<Outcome> {
    let key = issue_key(&params.issue);
    tracing::debug!("Reading field [{}] of issue {}", params.field_name, key);

    let value = jira.get_field_value(&key, &params.field_name).await?;
    Ok(Outcome::Value(value))
}

/// Status changes go through the workflow; any other field is written directly.
pub async fn set_field_value(jira: &JiraClient, params: SetFieldValueParams) -> Result<Outcome> {
    let key = issue_key(&params.issue);

    if params.field_name.to_lowercase() == STATUS_FIELD {
        tracing::debug!("Moving issue {} to status '{}'", key, params.new_value);
        let transition = jira.transition_status(&key, &params.new_value).await?;
        tracing::info!("Issue {} transitioned with [{}]", key, transition.name);
        return Ok(Outcome::Done);
    }

    tracing::debug!("Updating field [{}] of issue {}", params.field_name, key);
    jira.update_field(&key, &params.field_name, &params.new_value)
        .await?;
    Ok(Outcome::Done)
}
