use jiraplug_daemon::{ApiHandler, ResponseEnvelope};
use jiraplug_jira::JiraClient;
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn handler_for(server: &MockServer) -> Arc<ApiHandler> {
    let jira = JiraClient::new(&server.uri(), "bot", "token").unwrap();
    Arc::new(ApiHandler::new(Arc::new(jira)))
}

async fn send(handler: &Arc<ApiHandler>, message: Value) -> Value {
    let response: ResponseEnvelope = handler.process(&message.to_string()).await;
    serde_json::from_str(&response.to_json().unwrap()).unwrap()
}

fn transitions() -> Value {
    json!({
        "transitions": [
            { "id": "11", "name": "Reopen",
              "to": { "name": "Open", "statusCategory": { "name": "To Do" } } },
            { "id": "31", "name": "Close",
              "to": { "name": "Done", "statusCategory": { "name": "Done" } } }
        ]
    })
}

#[tokio::test]
async fn test_get_field_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/PRJ-5"))
        .and(query_param("fields", "assignee"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "fields": { "assignee": { "name": "maria" } } })),
        )
        .mount(&server)
        .await;

    let handler = handler_for(&server);
    let response = send(
        &handler,
        json!({
            "requestId": "q-1", "action": "getFieldValue",
            "projectKey": "PRJ", "taskNumber": "5", "fieldName": "assignee"
        }),
    )
    .await;

    assert_eq!(response, json!({ "requestId": "q-1", "value": "maria" }));
}

#[tokio::test]
async fn test_get_field_value_on_rejected_read() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Issue Does Not Exist"))
        .mount(&server)
        .await;

    let handler = handler_for(&server);
    let response = send(
        &handler,
        json!({
            "requestId": "q-2", "action": "getfieldvalue",
            "projectKey": "PRJ", "taskNumber": "999", "fieldName": "summary"
        }),
    )
    .await;

    assert_eq!(response, json!({ "requestId": "q-2", "value": null }));
}

#[tokio::test]
async fn test_get_field_value_with_unreadable_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let handler = handler_for(&server);
    let response = send(
        &handler,
        json!({
            "requestId": "q-3", "action": "getFieldValue",
            "projectKey": "PRJ", "taskNumber": "1", "fieldName": "summary"
        }),
    )
    .await;

    assert_eq!(response["requestId"], "q-3");
    let error = response["error"].as_str().unwrap();
    assert!(error.starts_with("Could not get the issue field [summary] from issue key [PRJ-1]."));
    assert!(response.get("value").is_none());
}

#[tokio::test]
async fn test_set_plain_field() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/PRJ-5"))
        .and(body_json(json!({ "fields": { "summary": "Renamed" } })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let handler = handler_for(&server);
    let response = send(
        &handler,
        json!({
            "requestId": "s-1", "action": "setFieldValue",
            "projectKey": "PRJ", "taskNumber": "5", "fieldName": "summary", "newValue": "Renamed"
        }),
    )
    .await;

    assert_eq!(response, json!({ "requestId": "s-1" }));
}

#[tokio::test]
async fn test_set_status_goes_through_transitions() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/PRJ-5/transitions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(transitions()))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/PRJ-5/transitions"))
        .and(body_json(json!({ "transition": { "id": "31" } })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let handler = handler_for(&server);
    let response = send(
        &handler,
        json!({
            "requestId": "s-2", "action": "setFieldValue",
            "projectKey": "PRJ", "taskNumber": "5", "fieldName": "Status", "newValue": "done"
        }),
    )
    .await;

    assert_eq!(response, json!({ "requestId": "s-2" }));
}

#[tokio::test]
async fn test_set_status_without_matching_transition() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/api/2/issue/PRJ-5/transitions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(transitions()))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let handler = handler_for(&server);
    let response = send(
        &handler,
        json!({
            "requestId": "s-3", "action": "setFieldValue",
            "projectKey": "PRJ", "taskNumber": "5", "fieldName": "STATUS", "newValue": "Blocked"
        }),
    )
    .await;

    assert_eq!(
        response,
        json!({
            "requestId": "s-3",
            "error": "Unable to find a suitable transition to 'Blocked' for issue: [PRJ-5]"
        })
    );
}

#[tokio::test]
async fn test_set_field_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Field 'foo' cannot be set"))
        .mount(&server)
        .await;

    let handler = handler_for(&server);
    let response = send(
        &handler,
        json!({
            "requestId": "s-4", "action": "setFieldValue",
            "projectKey": "PRJ", "taskNumber": "5", "fieldName": "foo", "newValue": "bar"
        }),
    )
    .await;

    assert_eq!(response["requestId"], "s-4");
    assert_eq!(
        response["error"],
        format!(
            "Could not update issue field [foo] from issue key [PRJ-5]. Jira server:[{}]. \
             Error:Jira responded with status 400",
            server.uri()
        )
    );
}

#[tokio::test]
async fn test_unreachable_jira_is_reported_not_fatal() {
    // Nothing listens on this port.
    let jira = JiraClient::new("http://127.0.0.1:9", "bot", "token").unwrap();
    let handler = Arc::new(ApiHandler::new(Arc::new(jira)));

    for id in ["u-1", "u-2"] {
        let response = send(
            &handler,
            json!({
                "requestId": id, "action": "setFieldValue",
                "projectKey": "PRJ", "taskNumber": "5", "fieldName": "status", "newValue": "Done"
            }),
        )
        .await;
        assert_eq!(response["requestId"], id);
        assert!(response["error"]
            .as_str()
            .unwrap()
            .starts_with("Could not retrieve the transitions for issue [PRJ-5]."));
    }
}
