//! Keeps a ClickUp task's description in step with the labels on a Jira issue.
//!
//! Jira calls the webhook with an issue event; the highest-priority recognised label
//! (`Due`, then `Ready` by default) becomes the description of a single configured ClickUp task.

pub mod clickup;
pub mod config;
pub mod envelope;
pub mod event;
pub mod handler;
pub mod server;

pub use clickup::TaskClient;
pub use config::Config;
pub use envelope::{Envelope, Status};
pub use handler::{Context, HandlerResponse, NO_UPDATE_MESSAGE, handle_event};
