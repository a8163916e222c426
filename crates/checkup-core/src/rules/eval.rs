use crate::report::model::Check;
use crate::rules::catalog::{CheckState, SeverityThreshold};

/// Describes every failing check whose severity falls within `threshold`.
///
/// Each entry reads `Type: {type}. Details. {check}`. Input order is kept,
/// and the result is empty (never absent) when nothing matches.
pub fn filter_failing(checks: &[Check], threshold: SeverityThreshold) -> Vec<String> {
    checks
        .iter()
        .filter(|check| threshold.includes(check.severity) && check.state == CheckState::Failed)
        .map(|check| format!("Type: {}. Details. {}", check.kind, check))
        .collect()
}
