//! Issue field reads and writes
//!
//! Fields outside a small set of plain-text fields are reference fields (e.g.
//! `assignee`): Jira stores them as objects and they are read and written
//! through their nested `name` property. The read and write shapes must agree
//! for every field name.

use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::client::JiraClient;
use crate::error::{Error, Result};
use crate::types::{IssueKey, JiraIssueFields};

const FIELDS_PROPERTY: &str = "fields";
const NAME_PROPERTY: &str = "name";
const WELL_KNOWN_STRING_FIELDS: [&str; 2] = ["summary", "description"];

pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// Whether the field is accessed through `fields.<name>.name`.
pub fn is_reference_field(field_name: &str) -> bool {
    !WELL_KNOWN_STRING_FIELDS
        .iter()
        .any(|known| eq_ignore_case(known, field_name))
}

/// Body of `PUT issue/{key}`: `{"fields": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldUpdate {
    pub fields: Map<String, Value>,
}

impl FieldUpdate {
    pub fn new(field_name: &str, new_value: &str) -> Self {
        let value = if is_reference_field(field_name) {
            let mut named = Map::new();
            named.insert(NAME_PROPERTY.to_string(), Value::from(new_value));
            Value::Object(named)
        } else {
            Value::from(new_value)
        };

        let mut fields = Map::new();
        fields.insert(field_name.to_string(), value);
        Self { fields }
    }
}

/// Extract a field value from an issue response body.
///
/// `Ok(None)` means the field exists but holds `null`. A missing path, an
/// unparsable body or a non-scalar value is an error, logged with the raw body.
pub fn read_field(response: &str, field_name: &str) -> Result<Option<String>> {
    read_field_path(response, field_name).map_err(|e| {
        tracing::error!(
            "Error reading Json property [{}]:{}\n\nResponse contents:[{}]",
            field_name,
            e,
            response
        );
        e
    })
}

fn read_field_path(response: &str, field_name: &str) -> Result<Option<String>> {
    let issue: JiraIssueFields = serde_json::from_str(response)?;
    let flat_path = format!("{}.{}", FIELDS_PROPERTY, field_name);

    let value = issue
        .fields
        .get(field_name)
        .ok_or_else(|| Error::FieldPath {
            path: flat_path.clone(),
        })?;

    if !is_reference_field(field_name) {
        return scalar_to_string(value).ok_or(Error::FieldPath { path: flat_path });
    }

    let nested_path = format!("{}.{}", flat_path, NAME_PROPERTY);
    value
        .get(NAME_PROPERTY)
        .and_then(scalar_to_string)
        .ok_or(Error::FieldPath { path: nested_path })
}

/// `None` for non-scalars, `Some(None)` for `null`.
fn scalar_to_string(value: &Value) -> Option<Option<String>> {
    match value {
        Value::Null => Some(None),
        Value::String(s) => Some(Some(s.clone())),
        Value::Bool(b) => Some(Some(b.to_string())),
        Value::Number(n) => Some(Some(n.to_string())),
        Value::Array(_) | Value::Object(_) => None,
    }
}

impl JiraClient {
    /// `GET issue/{key}?fields={field}` and decode the field.
    ///
    /// A non-success status is a failed read with no value (`Ok(None)`), never
    /// a partially parsed one.
    pub async fn get_field_value(
        &self,
        issue_key: &IssueKey,
        field_name: &str,
    ) -> Result<Option<String>> {
        self.fetch_field_value(issue_key, field_name)
            .await
            .map_err(|e| Error::FieldRead {
                field: field_name.to_string(),
                issue_key: issue_key.to_string(),
                server: self.server_url().to_string(),
                source: Box::new(e),
            })
    }

    async fn fetch_field_value(
        &self,
        issue_key: &IssueKey,
        field_name: &str,
    ) -> Result<Option<String>> {
        let mut uri = self.rest_uri(&format!("issue/{}", issue_key))?;
        uri.query_pairs_mut().append_pair(FIELDS_PROPERTY, field_name);

        let request = self.authenticated_request(uri, Method::GET);
        let response = match self.execute(request).await {
            Ok(body) => body,
            Err(Error::Rejected { .. }) => return Ok(None),
            Err(e) => return Err(e),
        };

        if response.is_empty() {
            return Ok(None);
        }

        read_field(&response, field_name)
    }

    /// `PUT issue/{key}` with the field in its flat or nested shape.
    pub async fn update_field(
        &self,
        issue_key: &IssueKey,
        field_name: &str,
        new_value: &str,
    ) -> Result<()> {
        let update = FieldUpdate::new(field_name, new_value);

        let result = async {
            let uri = self.rest_uri(&format!("issue/{}", issue_key))?;
            let request = self.write_request(uri, Method::PUT, &update)?;
            self.execute(request).await
        }
        .await;

        result.map(|_| ()).map_err(|e| Error::FieldUpdate {
            field: field_name.to_string(),
            issue_key: issue_key.to_string(),
            server: self.server_url().to_string(),
            source: Box::new(e),
        })
    }
}
