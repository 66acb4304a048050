//! The one ClickUp call this service makes: replacing a task's description.

use miette::Diagnostic;
use reqwest::{
    Client,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue},
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::{config::Config, envelope::Envelope};

/// A ClickUp API client bound to one base URL and token.
#[derive(Clone, Debug)]
pub struct TaskClient {
    client: Client,
    base_url: String,
}

impl TaskClient {
    /// ## Errors
    /// 1. The token can't be used as a header value
    /// 2. The underlying HTTP client can't be constructed
    pub fn new(config: &Config) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let mut token = HeaderValue::from_str(&config.token)?;
        token.set_sensitive(true);
        headers.insert(AUTHORIZATION, token);

        let mut builder = Client::builder().default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build().map_err(Error::Client)?,
            base_url: config.base_url.clone(),
        })
    }

    /// `PUT {base_url}/task/{task_id}` with a new description.
    ///
    /// Never fails: HTTP-level and transport-level problems are logged and come back as an
    /// error [`Envelope`]. A success response must carry a JSON body; an empty or non-JSON body
    /// is reported as a failed request.
    pub async fn update_task_description(&self, task_id: &str, description: &str) -> Envelope {
        match self.put_description(task_id, description).await {
            Ok(data) => Envelope::success("Task description updated successfully.", Some(data)),
            Err(UpdateError::Http { code, reason, body }) => {
                let status = format!("{code} {reason}");
                let status = status.trim_end();
                error!("HTTP error during task update: {status}");
                Envelope::error(format!("HTTP error: {status}"), Some(body))
            }
            Err(err) => {
                error!("Request failed: {err}");
                Envelope::error(format!("Request failed: {err}"), None)
            }
        }
    }

    async fn put_description(
        &self,
        task_id: &str,
        description: &str,
    ) -> Result<Value, UpdateError> {
        #[derive(Serialize)]
        struct Payload<'a> {
            description: &'a str,
        }

        let url = format!("{}/task/{task_id}", self.base_url);
        let response = self
            .client
            .put(&url)
            .json(&Payload { description })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(UpdateError::Http {
                code: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default(),
                body,
            });
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// Why a single task update didn't go through. Only ever surfaces inside an [`Envelope`].
#[derive(Debug, thiserror::Error)]
enum UpdateError {
    #[error("ClickUp responded with {code} {reason}")]
    Http {
        code: u16,
        reason: &'static str,
        body: String,
    },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("could not decode the response from ClickUp: {0}")]
    Decode(#[from] serde_json::Error),
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error("The ClickUp token is not a valid header value")]
    #[diagnostic(
        code(clickup::token),
        help("Check that TOKEN contains only visible ASCII characters")
    )]
    Token(#[from] InvalidHeaderValue),
    #[error("Could not build the HTTP client: {0}")]
    #[diagnostic(code(clickup::client))]
    Client(#[source] reqwest::Error),
}
