use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::api::ChecksApi;
use crate::error::CheckupError;
use crate::report::model::Operation;
use crate::report::render::issue_lines;
use crate::rules::catalog::FailOn;
use crate::rules::classify::{Verdict, classify};
use crate::rules::eval::filter_failing;
use crate::workflow::orchestrator::Phase;
use crate::workflow::sink::LogSink;
use crate::workflow::state::PollState;
use crate::workflow::{Evaluation, Outcome, stopped};

/// Polling and evaluation half of an orchestration.
///
/// Runs as one task on the shared runtime. Each tick awaits its call before
/// the next tick is taken, so checks for one operation never overlap.
pub(crate) struct Poller<A> {
    pub(crate) api: A,
    pub(crate) sink: Arc<dyn LogSink>,
    pub(crate) interval: Duration,
    pub(crate) state: PollState,
    pub(crate) state_file: Option<PathBuf>,
}

impl<A: ChecksApi> Poller<A> {
    pub(crate) async fn run(
        self,
        mut stop: watch::Receiver<Option<String>>,
    ) -> Result<Outcome, CheckupError> {
        let result = self.poll_and_evaluate(&mut stop).await;

        match &result {
            Ok(_) => info!(operation_id = %self.state.operation_id, "orchestration succeeded"),
            Err(err) => {
                warn!(operation_id = %self.state.operation_id, error = %err, "orchestration failed");
                self.sink.error(err);
            }
        }

        // A stopped run keeps its state so it can be resumed.
        if let Some(path) = &self.state_file {
            if !matches!(result, Err(CheckupError::Stopped(_))) {
                if let Err(err) = PollState::discard(path).await {
                    warn!(error = %err, "could not remove poll state");
                }
            }
        }

        result
    }

    async fn poll_and_evaluate(
        &self,
        stop: &mut watch::Receiver<Option<String>>,
    ) -> Result<Outcome, CheckupError> {
        let (operation, timed_out) = self.poll(stop).await?;
        self.evaluate(operation, timed_out, stop).await
    }

    /// Checks the operation until it is done or the deadline has passed.
    async fn poll(
        &self,
        stop: &mut watch::Receiver<Option<String>>,
    ) -> Result<(Operation, bool), CheckupError> {
        let operation_id = self.state.operation_id.as_str();
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                cause = stopped(stop) => return Err(CheckupError::Stopped(cause)),
                _ = ticker.tick() => {}
            }

            let now = Utc::now();
            self.sink
                .line(&format!("Checking on operationId={operation_id}"));

            let operation = tokio::select! {
                biased;
                cause = stopped(stop) => return Err(CheckupError::Stopped(cause)),
                operation = self.api.check_operation(operation_id) => operation?,
            };

            if operation.done {
                return Ok((operation, false));
            }
            if self.state.expired_at(now) {
                info!(operation_id, deadline = %self.state.deadline, "poll deadline reached");
                return Ok((operation, true));
            }
        }
    }

    async fn evaluate(
        &self,
        operation: Operation,
        timed_out: bool,
        stop: &mut watch::Receiver<Option<String>>,
    ) -> Result<Outcome, CheckupError> {
        info!(phase = %Phase::Evaluating, timed_out);
        let config = &self.state.config;
        let operation_id = self.state.operation_id.clone();

        let Some(reference) = operation.response else {
            if !timed_out {
                return Err(CheckupError::MissingReport(operation_id));
            }
            self.sink
                .line(&format!("Timed out waiting for operationId={operation_id}"));
            return match config.fail_on {
                FailOn::All => Err(CheckupError::ReportUnavailable(operation_id)),
                FailOn::None => Ok(Outcome::TimedOut { operation_id }),
            };
        };

        self.sink.line(&format!(
            "Report console URL: {}",
            reference.results_uri.as_deref().unwrap_or("unavailable")
        ));

        let report_id = reference.report_id().to_string();
        let report = tokio::select! {
            biased;
            cause = stopped(stop) => return Err(CheckupError::Stopped(cause)),
            report = self.api.get_report(&report_id) => report?,
        };

        let failing = filter_failing(&report.checks, config.severity_threshold);
        for line in issue_lines(&failing) {
            self.sink.line(&line);
        }

        match classify(&failing, config.fail_on) {
            Verdict::Fail => Err(CheckupError::ReportHasErrors(failing.len())),
            Verdict::Pass => Ok(Outcome::Evaluated(Evaluation {
                operation_id,
                report_id,
                results_uri: reference.results_uri,
                severity_threshold: config.severity_threshold,
                timed_out,
                failing_checks: failing,
            })),
        }
    }
}
