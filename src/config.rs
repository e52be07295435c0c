use crate::{
    error::{TsiError, TsiResult},
    query::DEFAULT_API_VERSION,
};
use std::time::Duration;

pub const ENV_ENVIRONMENT_ID: &str = "TSICLIENT_ENVIRONMENT_ID";
pub const ENV_APPLICATION_NAME: &str = "TSICLIENT_APPLICATION_NAME";
pub const ENV_API_VERSION: &str = "TSICLIENT_API_VERSION";
pub const ENV_TIMEOUT_SECS: &str = "TSICLIENT_TIMEOUT_SECS";

/// Per-request timeout used when nothing else is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings needed to address a TSI environment
#[derive(Debug, Clone, PartialEq)]
pub struct TsiConfig {
    pub environment_id: String,
    pub application_name: String,
    pub api_version: String,
    pub timeout: Duration,
}

impl TsiConfig {
    pub fn new(environment_id: impl Into<String>, application_name: impl Into<String>) -> Self {
        Self {
            environment_id: environment_id.into(),
            application_name: application_name.into(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Load from the `TSICLIENT_*` environment variables
    pub fn from_env() -> TsiResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> TsiResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| TsiError::Config(format!("{} is not set", key)))
        };

        let mut config = Self::new(required(ENV_ENVIRONMENT_ID)?, required(ENV_APPLICATION_NAME)?);

        if let Some(version) = lookup(ENV_API_VERSION).filter(|v| !v.trim().is_empty()) {
            config.api_version = version;
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                TsiError::Config(format!("{} must be a whole number of seconds, got {:?}", ENV_TIMEOUT_SECS, raw))
            })?;
            if secs == 0 {
                return Err(TsiError::Config(format!("{} must be greater than zero", ENV_TIMEOUT_SECS)));
            }
            config.timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }
}
