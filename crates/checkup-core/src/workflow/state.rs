use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CheckupError;
use crate::workflow::config::StepConfig;

/// What a suspended orchestration needs to resume polling.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollState {
    pub config: StepConfig,
    pub operation_id: String,
    pub deadline: DateTime<Utc>,
}

impl PollState {
    pub fn new(
        config: StepConfig,
        operation_id: impl Into<String>,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Self {
        let deadline = chrono::Duration::from_std(timeout)
            .ok()
            .and_then(|budget| now.checked_add_signed(budget))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        Self {
            config,
            operation_id: operation_id.into(),
            deadline,
        }
    }

    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        self.deadline < now
    }

    pub async fn save(&self, path: &Path) -> Result<(), CheckupError> {
        let json = serde_json::to_vec_pretty(self).map_err(|e| state_error(path, e))?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| state_error(path, e))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| state_error(path, e))
    }

    pub async fn load(path: &Path) -> Result<Self, CheckupError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| state_error(path, e))?;
        serde_json::from_slice(&bytes).map_err(|e| state_error(path, e))
    }

    /// Deletes a saved state; a file that is already gone is fine.
    pub async fn discard(path: &Path) -> Result<(), CheckupError> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(state_error(path, e)),
        }
    }
}

fn state_error(path: &Path, source: impl Into<std::io::Error>) -> CheckupError {
    CheckupError::State {
        path: PathBuf::from(path),
        source: source.into(),
    }
}
