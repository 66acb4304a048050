//! Read and update Jira issues with static Basic-auth credentials.

pub mod client;
pub mod config;
pub mod update;

pub use client::{JiraClient, RequestError};
pub use config::Credentials;
