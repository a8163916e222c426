//! Final verdict for an evaluated report.
//!
//! Policy:
//!
//!   - `FailOn::All` and at least one failing check -> FAIL
//!   - everything else                              -> PASS
//!
//! Failing checks under `FailOn::None` are informational only.

use serde::{Deserialize, Serialize};

use crate::rules::catalog::FailOn;

/// Build outcome derived from the failing checks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Verdict {
    Pass,
    Fail,
}

pub fn classify(failing: &[String], fail_on: FailOn) -> Verdict {
    match fail_on {
        FailOn::All if !failing.is_empty() => Verdict::Fail,
        _ => Verdict::Pass,
    }
}
