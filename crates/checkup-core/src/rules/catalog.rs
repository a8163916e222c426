use serde::{Deserialize, Serialize};

/// Severity reported by the Checks API for a single check.
///
/// Unknown values are rejected during deserialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Priority,
    Potential,
    Opportunity,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Priority, Severity::Potential, Severity::Opportunity];

    /// Position in the inclusiveness order; PRIORITY is the narrowest.
    fn rank(self) -> u8 {
        match self {
            Severity::Priority => 0,
            Severity::Potential => 1,
            Severity::Opportunity => 2,
        }
    }
}

/// Outcome of a single check.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CheckState {
    #[serde(rename = "CHECK_STATE_UNSPECIFIED")]
    Unspecified,
    Passed,
    Failed,
    Unchecked,
}

/// Minimum severity a failing check must carry to count against the build.
///
/// Ordered by inclusiveness: `Priority < Potential < Opportunity`.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SeverityThreshold {
    #[default]
    Priority,
    Potential,
    Opportunity,
}

impl SeverityThreshold {
    pub const ALL: [SeverityThreshold; 3] = [
        SeverityThreshold::Priority,
        SeverityThreshold::Potential,
        SeverityThreshold::Opportunity,
    ];

    fn rank(self) -> u8 {
        match self {
            SeverityThreshold::Priority => 0,
            SeverityThreshold::Potential => 1,
            SeverityThreshold::Opportunity => 2,
        }
    }

    /// Returns true when `severity` is at or above this threshold's strictness.
    pub fn includes(self, severity: Severity) -> bool {
        severity.rank() <= self.rank()
    }
}

impl std::fmt::Display for SeverityThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SeverityThreshold::Priority => "PRIORITY",
            SeverityThreshold::Potential => "POTENTIAL",
            SeverityThreshold::Opportunity => "OPPORTUNITY",
        };
        f.write_str(name)
    }
}

/// Whether failing checks fail the build.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FailOn {
    #[default]
    None,
    All,
}
