use crate::TOOL_NAME;
use crate::workflow::Outcome;

pub const NO_ISSUES: &str = "No issues detected.";

/// Workflow log lines describing the failing checks of a report.
pub fn issue_lines(failing: &[String]) -> Vec<String> {
    if failing.is_empty() {
        return vec![NO_ISSUES.to_string()];
    }
    let mut lines = Vec::with_capacity(failing.len() + 1);
    lines.push(format!("{} issue(s) detected:", failing.len()));
    lines.extend(failing.iter().cloned());
    lines
}

/// Plain-text summary of a finished run.
pub fn render_text(outcome: &Outcome) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", TOOL_NAME, env!("CARGO_PKG_VERSION")));
    match outcome {
        Outcome::AuthenticationVerified { .. } => {
            out.push_str("Status: authentication verified (report generation disabled)\n");
        }
        Outcome::Deferred { operation_id } => {
            out.push_str(&format!("Status: upload accepted, operation {operation_id}\n"));
        }
        Outcome::TimedOut { operation_id } => {
            out.push_str(&format!("Status: timed out waiting for operation {operation_id}\n"));
        }
        Outcome::Evaluated(evaluation) => {
            out.push_str("Status: report evaluated\n");
            out.push_str(&format!("Report: {}\n", evaluation.report_id));
            if let Some(uri) = &evaluation.results_uri {
                out.push_str(&format!("Console: {uri}\n"));
            }
            out.push_str(&format!("Threshold: {}\n", evaluation.severity_threshold));
            out.push_str(&format!("Failing checks: {}\n", evaluation.failing_checks.len()));
            for check in &evaluation.failing_checks {
                out.push_str(&format!("  - {check}\n"));
            }
        }
    }
    out
}
