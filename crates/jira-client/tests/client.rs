#![allow(clippy::unwrap_used)]

use std::time::Duration;

use jira_client::{Credentials, JiraClient, RequestError};
use pretty_assertions::assert_eq;
use reqwest::Method;
use serde_json::json;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{body_json, header, method, path},
};

const AUTH: &str = "Basic bWVAZXhhbXBsZS5jb206c2VjcmV0";

fn client(base_url: &str, timeout: Option<Duration>) -> JiraClient {
    let credentials = Credentials {
        base_url: base_url.to_string(),
        email: "me@example.com".to_string(),
        token: "secret".to_string(),
        timeout,
    };
    JiraClient::new(&credentials).unwrap()
}

#[tokio::test]
async fn confirm_connection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/board"))
        .and(header("authorization", AUTH))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"values": []})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(client(&server.uri(), None).confirm_connection().await);
}

#[tokio::test]
async fn confirm_connection_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/board"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client(&server.uri(), None).confirm_connection().await);
}

#[tokio::test]
async fn confirm_connection_with_empty_response() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/board"))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/board"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    let client = client(&server.uri(), None);

    assert!(!client.confirm_connection().await);
    assert!(!client.confirm_connection().await);
}

#[tokio::test]
async fn get_issue_returns_body_unchanged() {
    let issue = json!({
        "id": "10048",
        "key": "WM-48",
        "fields": {"summary": "Wire up labels", "labels": ["Ready"], "description": null}
    });
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/issue/WM-48"))
        .and(header("authorization", AUTH))
        .respond_with(ResponseTemplate::new(200).set_body_json(&issue))
        .expect(1)
        .mount(&server)
        .await;

    let fetched = client(&server.uri(), None).get_issue("WM-48").await;

    assert_eq!(fetched, Some(issue));
}

#[tokio::test]
async fn get_issue_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/issue/WM-404"))
        .respond_with(
            ResponseTemplate::new(404)
                .set_body_json(json!({"errorMessages": ["Issue does not exist"]})),
        )
        .mount(&server)
        .await;

    let client = client(&server.uri(), None);

    assert_eq!(client.get_issue("WM-404").await, None);
    let err = client
        .send(
            Method::GET,
            &format!("{}/rest/agile/1.0/issue/WM-404", server.uri()),
            None,
        )
        .await
        .unwrap_err();
    match err {
        RequestError::Http { code, reason, body } => {
            assert_eq!(code, 404);
            assert_eq!(reason, "Not Found");
            assert!(body.contains("Issue does not exist"));
        }
        other => panic!("Expected an HTTP error, got {other:?}"),
    }
}

#[tokio::test]
async fn update_issue_sends_fields() {
    let update = json!({"fields": {"description": "New description here", "labels": ["Ready"]}});
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/WM-48"))
        .and(header("authorization", AUTH))
        .and(header("content-type", "application/json"))
        .and(body_json(&update))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server.uri(), None)
        .update_issue("WM-48", &update)
        .await;

    assert_eq!(result, None);
}

#[tokio::test]
async fn update_issue_returns_body_unchanged() {
    let update = json!({"fields": {"labels": ["Due"]}});
    let updated = json!({"key": "WM-48", "fields": {"labels": ["Due"]}});
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/rest/api/2/issue/WM-48"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&updated))
        .mount(&server)
        .await;

    let result = client(&server.uri(), None)
        .update_issue("WM-48", &update)
        .await;

    assert_eq!(result, Some(updated));
}

#[tokio::test]
async fn post_through_request_helper() {
    let payload = json!({"jql": "project = WM"});
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/api/2/search"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"issues": []})))
        .expect(1)
        .mount(&server)
        .await;

    let result = client(&server.uri(), None)
        .request(
            Method::POST,
            &format!("{}/rest/api/2/search", server.uri()),
            Some(&payload),
        )
        .await;

    assert_eq!(result, Some(json!({"issues": []})));
}

#[tokio::test]
async fn timeout_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    let client = client(&server.uri(), Some(Duration::from_secs(1)));

    assert_eq!(client.get_issue("WM-48").await, None);
    let err = client
        .send(Method::GET, &format!("{}/rest/agile/1.0/board", server.uri()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Transport(_)), "{err:?}");
}

#[tokio::test]
async fn connection_refused_is_none() {
    let client = client("http://127.0.0.1:1", None);

    assert_eq!(client.get_issue("WM-48").await, None);
    assert!(!client.confirm_connection().await);
}

#[tokio::test]
async fn non_json_success_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&server)
        .await;
    let client = client(&server.uri(), None);

    assert_eq!(client.get_issue("WM-48").await, None);
    let err = client
        .send(Method::GET, &format!("{}/anything", server.uri()), None)
        .await
        .unwrap_err();
    assert!(matches!(err, RequestError::Decode(_)), "{err:?}");
}
