use serde::{Deserialize, Deserializer, Serialize};

use crate::rules::catalog::{CheckState, Severity};
use crate::util::resource::resource_id;

/// Response of `reports:analyzeUpload`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadResult {
    /// Operation resource name, e.g. `accounts/1/apps/12/operations/123`.
    pub name: String,
}

impl UploadResult {
    pub fn operation_id(&self) -> &str {
        resource_id(&self.name)
    }
}

/// Snapshot of a long-running analysis operation.
///
/// A pending operation only carries `name`; `done` is absent or `null` until
/// the server finishes, and both read as `false`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Operation {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_false")]
    pub done: bool,
    #[serde(default)]
    pub response: Option<ReportReference>,
}

fn null_as_false<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Pointer to the report produced by a finished operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReportReference {
    /// Report resource name, e.g. `accounts/1/apps/12/reports/456`.
    pub name: String,
    #[serde(default)]
    pub results_uri: Option<String>,
}

impl ReportReference {
    pub fn report_id(&self) -> &str {
        resource_id(&self.name)
    }
}

/// Report restricted to `name,checks(type,state,severity)`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub checks: Vec<Check>,
}

/// A single finding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Check {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub state: CheckState,
    pub severity: Severity,
}

impl Check {
    pub fn new(kind: impl Into<String>, state: CheckState, severity: Severity) -> Self {
        Self {
            kind: kind.into(),
            state,
            severity,
        }
    }
}

impl std::fmt::Display for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| std::fmt::Error)?;
        f.write_str(&json)
    }
}
