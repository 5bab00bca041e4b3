//! Workflow backend configuration

use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;

/// Where and how to reach the meeting workflow service
#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the workflow service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Whole-request timeout in seconds; covers the streamed body
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Path of the scan endpoint
    #[serde(default = "default_fetch_path")]
    pub fetch_path: String,

    /// Path prefix of the schedule endpoint; the thread id is appended
    #[serde(default = "default_schedule_path")]
    pub schedule_path: String,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate backend configuration
    ///
    /// Production requires HTTPS unless the service runs on this host.
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        let url = Url::parse(&self.base_url)
            .map_err(|_| ValidationError::InvalidBackendUrl(self.base_url.clone()))?;
        match url.scheme() {
            "http" | "https" => {}
            _ => return Err(ValidationError::InvalidBackendUrl(self.base_url.clone())),
        }
        if *environment == Environment::Production
            && url.scheme() != "https"
            && !is_local(url.host_str())
        {
            return Err(ValidationError::BackendMustBeHttps);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidBackendTimeout);
        }
        for path in [&self.fetch_path, &self.schedule_path] {
            if !path.starts_with('/') {
                return Err(ValidationError::InvalidPath(path.clone()));
            }
        }
        Ok(())
    }
}

fn is_local(host: Option<&str>) -> bool {
    matches!(host, Some("localhost") | Some("127.0.0.1") | Some("[::1]"))
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            fetch_path: default_fetch_path(),
            schedule_path: default_schedule_path(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_fetch_path() -> String {
    "/api/fetch-meetings".to_string()
}

fn default_schedule_path() -> String {
    "/api/schedule-meetings".to_string()
}
