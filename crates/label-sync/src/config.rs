use std::{net::SocketAddr, time::Duration};

use miette::Diagnostic;

use crate::event::LabelPriority;

const DEFAULT_BASE_URL: &str = "https://api.clickup.com/api/v2";
const DEFAULT_TASK_ID: &str = "86dw30c2d";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Everything the webhook handler needs, read once at startup and never mutated.
#[derive(Clone, Debug)]
pub struct Config {
    /// Root of the ClickUp REST API, without a trailing slash.
    pub base_url: String,
    /// Raw ClickUp API token, sent as-is in the `Authorization` header.
    pub token: String,
    /// The ClickUp task whose description mirrors the Jira labels.
    pub task_id: String,
    pub label_priority: LabelPriority,
    /// `None` means outbound requests may block for as long as the remote takes.
    pub request_timeout: Option<Duration>,
    pub bind_addr: SocketAddr,
}

impl Config {
    /// Load from the process environment.
    ///
    /// ## Errors
    /// 1. `TOKEN` is not set
    /// 2. Any optional variable is set to something that can't be parsed
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from any key/value source, used by [`Config::from_env`] and tests.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let base_url = lookup("BASE_URL")
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let token = lookup("TOKEN")
            .filter(|token| !token.is_empty())
            .ok_or(Error::Missing("TOKEN"))?;
        let task_id = lookup("TASK_ID").unwrap_or_else(|| DEFAULT_TASK_ID.to_string());
        let label_priority = lookup("LABEL_PRIORITY")
            .map(|raw| LabelPriority::parse(&raw))
            .unwrap_or_default();
        if label_priority.is_empty() {
            return Err(Error::EmptyLabelPriority);
        }
        let request_timeout = lookup("REQUEST_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| Error::Invalid {
                        key: "REQUEST_TIMEOUT_SECS",
                        value: raw,
                    })
            })
            .transpose()?;
        let bind_addr = lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse().map_err(|_| Error::Invalid {
            key: "BIND_ADDR",
            value: bind_addr.clone(),
        })?;

        Ok(Self {
            base_url,
            token,
            task_id,
            label_priority,
            request_timeout,
            bind_addr,
        })
    }
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error("The environment variable {0} is not set")]
    #[diagnostic(
        code(config::missing),
        help("Set {0} to your ClickUp API token before starting the webhook handler")
    )]
    Missing(&'static str),
    #[error("Could not parse {key}={value}")]
    #[diagnostic(code(config::invalid))]
    Invalid { key: &'static str, value: String },
    #[error("LABEL_PRIORITY does not name any labels")]
    #[diagnostic(
        code(config::label_priority),
        help("Provide a comma-separated list such as `Due,Ready`, highest priority first")
    )]
    EmptyLabelPriority,
}
