//! JIRA REST client
//!
//! Builds authenticated requests against `{server}/rest/api/2/` and turns
//! responses into body text or an explicit failure. No business logic and no
//! retries live here: one failed call is one failure for the caller.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;

use crate::auth::AccessToken;
use crate::error::{Error, Result};
use crate::types::IssueKey;

const BASE_URI_REST: &str = "/rest/api/2/";
const MYSELF_URI: &str = "myself";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Shared, read-only handle on one Jira server. Cheap to share behind an `Arc`;
/// nothing is mutated after construction.
#[derive(Debug, Clone)]
pub struct JiraClient {
    http: reqwest::Client,
    server_url: String,
    rest_url: Url,
    user: String,
    token: AccessToken,
}

impl JiraClient {
    pub fn new(server_url: &str, user: &str, password: &str) -> Result<Self> {
        let http = reqwest::Client::builder().build()?;
        Self::with_http_client(http, server_url, user, password)
    }

    pub fn with_http_client(
        http: reqwest::Client,
        server_url: &str,
        user: &str,
        password: &str,
    ) -> Result<Self> {
        Ok(Self {
            http,
            server_url: server_url.to_string(),
            rest_url: base_rest_url(server_url)?,
            user: user.to_string(),
            token: AccessToken::build(user, password),
        })
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Resolve a path relative to the REST root.
    pub fn rest_uri(&self, path: &str) -> Result<Url> {
        self.rest_url.join(path).map_err(|e| Error::InvalidUrl {
            url: format!("{}{}", self.rest_url, path),
            reason: e.to_string(),
        })
    }

    /// `{server}/browse/{issueKey}`.
    pub fn issue_page_url(&self, issue_key: &IssueKey) -> String {
        format!(
            "{}/browse/{}",
            self.server_url.strip_suffix('/').unwrap_or(&self.server_url),
            issue_key
        )
    }

    pub fn authenticated_request(&self, uri: Url, method: Method) -> RequestBuilder {
        self.http
            .request(method, uri)
            .header(AUTHORIZATION, self.token.to_basic_auth())
            .header(CONTENT_TYPE, JSON_CONTENT_TYPE)
    }

    pub fn write_request<T>(&self, uri: Url, method: Method, body: &T) -> Result<RequestBuilder>
    where
        T: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body)?;
        Ok(self
            .authenticated_request(uri, method)
            .header(ACCEPT, "*/*")
            .body(body))
    }

    /// Send a request. Any 2xx yields the body; other statuses are logged with
    /// the body and surface as [`Error::Rejected`].
    pub async fn execute(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if status.is_success() {
            return Ok(body);
        }

        tracing::error!(status = status.as_u16(), "Request error: {}", body);
        Err(Error::Rejected {
            status: status.as_u16(),
        })
    }

    /// Probe `GET myself` with the configured credentials.
    pub async fn check_connection(&self) -> bool {
        let uri = match self.rest_uri(MYSELF_URI) {
            Ok(uri) => uri,
            Err(e) => {
                tracing::error!("Check Connection: {}", e);
                return false;
            }
        };

        let request = self.authenticated_request(uri.clone(), Method::GET);
        match self.execute(request).await {
            Ok(body) if !body.trim().is_empty() => {
                tracing::debug!("Check Connection: OK. URL: [{}]. User: [{}]", uri, self.user);
                true
            }
            Ok(_) => {
                tracing::error!(
                    "Check Connection: Could not get info about the configured user. \
                     URL: [{}]. User: [{}]. Empty response.",
                    uri,
                    self.user
                );
                false
            }
            Err(e) => {
                tracing::error!(
                    "Check Connection: Could not get info about the configured user. \
                     URL: [{}]. User: [{}]. Message:[{}]",
                    uri,
                    self.user,
                    e
                );
                false
            }
        }
    }
}

/// Join the REST prefix onto the server URL without dropping a sub-path
/// install: `https://host/private/jira` becomes
/// `https://host/private/jira/rest/api/2/`.
fn base_rest_url(server_url: &str) -> Result<Url> {
    let mut host_url = server_url.trim().to_string();
    if !host_url.ends_with('/') {
        host_url.push('/');
    }

    let invalid = |reason: String| Error::InvalidUrl {
        url: server_url.to_string(),
        reason,
    };

    let base = Url::parse(&host_url).map_err(|e| invalid(e.to_string()))?;
    if base.cannot_be_a_base() {
        return Err(invalid("not a hierarchical URL".to_string()));
    }

    base.join(BASE_URI_REST.trim_start_matches('/'))
        .map_err(|e| invalid(e.to_string()))
}
