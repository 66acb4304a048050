use miette::Diagnostic;
use reqwest::{
    Client, Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde_json::Value;
use tracing::debug;

use crate::config::Credentials;

/// Talks to a single Jira instance with one fixed `Authorization` header.
#[derive(Clone, Debug)]
pub struct JiraClient {
    client: Client,
    base_url: String,
}

impl JiraClient {
    /// ## Errors
    /// 1. The credentials don't make a valid header value
    /// 2. The underlying HTTP client can't be constructed
    pub fn new(credentials: &Credentials) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&credentials.authorization())?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = credentials.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().map_err(Error::Client)?,
            base_url: credentials.base_url.clone(),
        })
    }

    /// Fetch the board listing to check that the credentials work.
    ///
    /// Prints a confirmation and the response only when Jira sends back something non-empty.
    /// Failures are printed by [`JiraClient::request`]; an empty success prints nothing.
    pub async fn confirm_connection(&self) -> bool {
        let url = format!("{}/rest/agile/1.0/board", self.base_url);
        match self.request(Method::GET, &url, None).await {
            Some(response) if !is_empty(&response) => {
                println!("Connection confirmed. User data received successfully.");
                println!("{}", pretty(&response));
                true
            }
            _ => false,
        }
    }

    /// Fetch an issue by its ID or key (e.g. `WM-48`).
    pub async fn get_issue(&self, issue_id_or_key: &str) -> Option<Value> {
        let url = format!("{}/rest/agile/1.0/issue/{issue_id_or_key}", self.base_url);
        self.request(Method::GET, &url, None).await
    }

    /// Update fields on an issue. `update` is shaped like `{"fields": {...}}`.
    ///
    /// Jira answers a successful update with `204 No Content`, so `None` is the usual result.
    pub async fn update_issue(&self, issue_id_or_key: &str, update: &Value) -> Option<Value> {
        let url = format!("{}/rest/api/2/issue/{issue_id_or_key}", self.base_url);
        self.request(Method::PUT, &url, Some(update)).await
    }

    /// Send a request and parse the JSON response, printing any failure.
    ///
    /// Failures and empty bodies both come back as `None`.
    pub async fn request(&self, method: Method, url: &str, data: Option<&Value>) -> Option<Value> {
        match self.send(method, url, data).await {
            Ok(value) => value,
            Err(err) => {
                report(&err);
                None
            }
        }
    }

    /// Like [`JiraClient::request`], but hands the failure back instead of printing it.
    ///
    /// ## Errors
    /// 1. [`RequestError::Http`] when Jira answers with a non-2xx status
    /// 2. [`RequestError::Transport`] when the request doesn't complete
    /// 3. [`RequestError::Decode`] when a non-empty success body isn't JSON
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        data: Option<&Value>,
    ) -> Result<Option<Value>, RequestError> {
        debug!("{method} {url}");
        let mut request = self.client.request(method, url);
        if let Some(data) = data {
            request = request.json(data);
        }
        let response = request.send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(RequestError::Http {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default(),
                body,
            });
        }
        if body.is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&body)?))
    }
}

fn report(err: &RequestError) {
    match err {
        RequestError::Http { body, .. } => {
            println!("{err}");
            if !body.is_empty() {
                let details = serde_json::from_str::<Value>(body)
                    .map_or_else(|_| body.clone(), |json| pretty(&json));
                println!("Error details: {details}");
            }
        }
        RequestError::Transport(_) | RequestError::Decode(_) => println!("An error occurred: {err}"),
    }
}

/// `null`, `false`, `0`, `""`, `[]` and `{}` carry no data.
#[allow(clippy::float_cmp)]
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// The two ways a call to Jira fails, plus a success body that isn't JSON.
#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum RequestError {
    #[error("HTTP error occurred: {code} {reason}")]
    #[diagnostic(
        code(jira::http),
        help("Jira rejected the request. Check the issue key and that your token has access to it.")
    )]
    Http {
        code: u16,
        reason: &'static str,
        body: String,
    },
    #[error(transparent)]
    #[diagnostic(
        code(jira::transport),
        help("The request never got a response. Check JIRA_BASE_URL and your network connection.")
    )]
    Transport(#[from] reqwest::Error),
    #[error("Could not decode the response from Jira: {0}")]
    #[diagnostic(code(jira::decode))]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error("The Jira credentials can't be sent as a header")]
    #[diagnostic(
        code(jira::credentials),
        help("JIRA_EMAIL and JIRA_TOKEN must contain only visible ASCII characters")
    )]
    Credentials(#[from] InvalidHeaderValue),
    #[error("Could not build the HTTP client: {0}")]
    #[diagnostic(code(jira::client))]
    Client(#[source] reqwest::Error),
}
