use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    time::Duration,
};

use base64::{Engine, prelude::BASE64_STANDARD as base64};
use miette::Diagnostic;
use tracing::debug;

pub const DEFAULT_ENV: &str = "development";

/// Static Jira credentials, loaded once per process.
#[derive(Clone, Debug)]
pub struct Credentials {
    /// e.g. `https://yourdomain.atlassian.net`, without a trailing slash
    pub base_url: String,
    pub email: String,
    /// A Jira API token, generated at <https://id.atlassian.com/manage-profile/security/api-tokens>
    pub token: String,
    /// `None` means requests wait as long as Jira takes.
    pub timeout: Option<Duration>,
}

impl Credentials {
    /// Load from `.env.<env>` in `dir`, with the process environment taking precedence over the
    /// file. A missing file is not an error; the process environment may have everything.
    ///
    /// ## Errors
    /// 1. The env file exists but can't be parsed
    /// 2. Any of `JIRA_EMAIL`, `JIRA_TOKEN`, `JIRA_BASE_URL` is missing from both sources
    pub fn load(env: &str, dir: &Path) -> Result<Self, Error> {
        let path = env_file_path(dir, env);
        let file = read_env_file(&path)?;
        Self::from_lookup(|key| std::env::var(key).ok().or_else(|| file.get(key).cloned()))
    }

    /// ## Errors
    /// 1. A required key is missing or empty
    /// 2. `JIRA_TIMEOUT_SECS` is not a whole number
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or(Error::Missing(key))
        };
        let timeout = lookup("JIRA_TIMEOUT_SECS")
            .map(|raw| {
                raw.parse::<u64>()
                    .map(Duration::from_secs)
                    .map_err(|_| Error::InvalidTimeout(raw))
            })
            .transpose()?;

        Ok(Self {
            email: required("JIRA_EMAIL")?,
            token: required("JIRA_TOKEN")?,
            base_url: required("JIRA_BASE_URL")?.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    /// The value of the `Authorization` header for HTTP Basic auth.
    #[must_use]
    pub fn authorization(&self) -> String {
        let Self { email, token, .. } = self;
        format!("Basic {}", base64.encode(format!("{email}:{token}")))
    }
}

#[must_use]
pub fn env_file_path(dir: &Path, env: &str) -> PathBuf {
    dir.join(format!(".env.{env}"))
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, Error> {
    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(err) if err.not_found() => {
            debug!("No env file at {}, using the process environment", path.display());
            return Ok(HashMap::new());
        }
        Err(source) => {
            return Err(Error::EnvFile {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    iter.collect::<Result<_, _>>()
        .map_err(|source| Error::EnvFile {
            path: path.to_path_buf(),
            source,
        })
}

#[derive(Debug, Diagnostic, thiserror::Error)]
pub enum Error {
    #[error("{0} is not set")]
    #[diagnostic(
        code(config::missing),
        help("Set {0} in the environment or in the `.env.<ENV>` file next to the executable")
    )]
    Missing(&'static str),
    #[error("JIRA_TIMEOUT_SECS must be a whole number of seconds, got {0}")]
    #[diagnostic(code(config::timeout))]
    InvalidTimeout(String),
    #[error("Could not read {path}")]
    #[diagnostic(code(config::env_file))]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },
}
