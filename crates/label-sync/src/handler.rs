//! The webhook entry point: Jira event in, at most one ClickUp update out.

use miette::Diagnostic;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{Instrument, error, info, info_span, warn};

use crate::{
    clickup::TaskClient,
    config::Config,
    event::{self, MalformedEvent},
};

pub const NO_UPDATE_MESSAGE: &str = "No relevant label found, no update made.";

/// Details about the invocation itself, as opposed to the event it carries.
#[derive(Clone, Debug, Default)]
pub struct Context {
    pub request_id: Option<String>,
}

/// What the trigger gets back. `body` is already serialized JSON.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HandlerResponse {
    pub status_code: u16,
    pub body: String,
}

impl HandlerResponse {
    fn ok(body: &impl Serialize) -> Result<Self, Error> {
        Ok(Self {
            status_code: 200,
            body: serde_json::to_string(body)?,
        })
    }

    fn internal_error(err: &Error) -> Self {
        Self {
            status_code: 500,
            body: Value::String(format!("Error: {err}")).to_string(),
        }
    }
}

/// Handle one Jira webhook event.
///
/// Picks the highest-priority recognised label on the issue and writes it as the description of
/// the configured ClickUp task. When no recognised label is present, nothing is sent and the
/// response is still a 200. A failed ClickUp call is reported inside the 200 body; only a
/// malformed event (or a body that can't be encoded) produces a 500.
pub async fn handle_event(
    config: &Config,
    client: &TaskClient,
    event: &Value,
    context: &Context,
) -> HandlerResponse {
    let span = info_span!(
        "jira_event",
        request_id = context.request_id.as_deref().unwrap_or("-")
    );
    async {
        match process(config, client, event).await {
            Ok(response) => response,
            Err(err) => {
                error!(error = ?err, "An error occurred while handling the event: {err}");
                HandlerResponse::internal_error(&err)
            }
        }
    }
    .instrument(span)
    .await
}

async fn process(
    config: &Config,
    client: &TaskClient,
    event: &Value,
) -> Result<HandlerResponse, Error> {
    info!("Received JIRA event:\n{}", serde_json::to_string_pretty(event)?);

    let labels = event::labels(event)?;
    info!("Extracted labels: {labels:?}");

    let Some(description) = config.label_priority.select(&labels) else {
        warn!("No matching label found in JIRA issue. Skipping ClickUp update.");
        return HandlerResponse::ok(&json!({ "message": NO_UPDATE_MESSAGE }));
    };

    let task_id = &config.task_id;
    info!("Updating ClickUp task {task_id} with description: {description}");
    let result = client.update_task_description(task_id, description).await;
    info!("ClickUp update result: {result:?}");

    HandlerResponse::ok(&result)
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    MalformedEvent(#[from] MalformedEvent),
    #[error("Could not serialize JSON: {0}")]
    #[diagnostic(code(handler::serialize))]
    Serialize(#[from] serde_json::Error),
}
