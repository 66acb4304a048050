//! HTTP trigger surface for the webhook handler.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use miette::Diagnostic;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::{
    clickup::{self, TaskClient},
    config::Config,
    handler::{Context, HandlerResponse, handle_event},
};

#[derive(Clone, Debug)]
pub struct AppState {
    pub config: Arc<Config>,
    pub client: TaskClient,
}

impl AppState {
    /// ## Errors
    /// 1. The ClickUp client can't be built from `config`
    pub fn new(config: Config) -> Result<Self, clickup::Error> {
        let client = TaskClient::new(&config)?;
        Ok(Self {
            config: Arc::new(config),
            client,
        })
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/webhook", post(jira_webhook))
        .route("/health", get(health_check))
        .with_state(state)
}

/// Bind to the configured address and serve until the process is stopped.
///
/// ## Errors
/// 1. The ClickUp client can't be built
/// 2. The address can't be bound or the server fails
pub async fn serve(config: Config) -> Result<(), Error> {
    let addr = config.bind_addr;
    let state = AppState::new(config)?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| Error::Bind { addr: addr.to_string(), source })?;
    info!("Listening for Jira webhooks on {addr}");
    axum::serve(listener, build_router(state))
        .await
        .map_err(Error::Serve)
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

async fn jira_webhook(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let context = Context {
        request_id: headers
            .get("x-request-id")
            .and_then(|value| value.to_str().ok())
            .map(String::from),
    };

    let event: Value = match serde_json::from_slice(&body) {
        Ok(event) => event,
        Err(err) => {
            warn!("Rejecting webhook with unparseable body: {err}");
            let body = Value::String(format!("Error: {err}")).to_string();
            return json_response(StatusCode::BAD_REQUEST, body);
        }
    };

    let HandlerResponse { status_code, body } =
        handle_event(&state.config, &state.client, &event, &context).await;
    let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    json_response(status, body)
}

fn json_response(status: StatusCode, body: String) -> Response {
    (status, [(CONTENT_TYPE, "application/json")], body).into_response()
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Client(#[from] clickup::Error),
    #[error("Could not listen on {addr}")]
    #[diagnostic(
        code(server::bind),
        help("Choose a free address with BIND_ADDR, e.g. `127.0.0.1:3000`")
    )]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },
    #[error("The HTTP server stopped unexpectedly")]
    #[diagnostic(code(server::serve))]
    Serve(#[source] std::io::Error),
}
