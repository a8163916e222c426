use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::api::endpoint::{ApiEndpoint, DEFAULT_BASE_URL};
use crate::rules::catalog::{FailOn, SeverityThreshold};

/// Seconds between two operation checks.
pub const CHECK_OPERATION_INTERVAL_SECS: u64 = 10;

/// Seconds an orchestration may spend polling before it evaluates anyway.
pub const TIMEOUT_AFTER_SECS: u64 = 30 * 60;

/// Step configuration supplied by the CI job.
///
/// Holds identifiers only; the credential id names a secret, it is never
/// the secret itself, so the struct is safe to persist.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StepConfig {
    pub project_id: String,
    pub account_id: String,
    pub app_id: String,
    pub binary_path: PathBuf,
    #[serde(default)]
    pub credential_id: Option<String>,
    #[serde(default = "enabled")]
    pub generate_report: bool,
    #[serde(default = "enabled")]
    pub wait_for_report: bool,
    #[serde(default)]
    pub severity_threshold: SeverityThreshold,
    #[serde(default)]
    pub fail_on: FailOn,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn enabled() -> bool {
    true
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl StepConfig {
    pub fn new(
        project_id: impl Into<String>,
        account_id: impl Into<String>,
        app_id: impl Into<String>,
        binary_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            account_id: account_id.into(),
            app_id: app_id.into(),
            binary_path: binary_path.into(),
            credential_id: None,
            generate_report: true,
            wait_for_report: true,
            severity_threshold: SeverityThreshold::default(),
            fail_on: FailOn::default(),
            base_url: default_base_url(),
        }
    }

    pub fn endpoint(&self) -> ApiEndpoint {
        ApiEndpoint {
            base_url: self.base_url.clone(),
            project_id: self.project_id.clone(),
            account_id: self.account_id.clone(),
            app_id: self.app_id.clone(),
        }
    }
}

/// Timer knobs for the poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(CHECK_OPERATION_INTERVAL_SECS),
            timeout: Duration::from_secs(TIMEOUT_AFTER_SECS),
        }
    }
}
