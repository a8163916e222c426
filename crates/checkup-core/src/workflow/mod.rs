//! Upload -> poll -> evaluate orchestration.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::warn;

use crate::error::CheckupError;
use crate::rules::catalog::SeverityThreshold;

pub mod config;
pub mod orchestrator;
pub mod poller;
pub mod sink;
pub mod state;

pub use config::{PollSettings, StepConfig};
pub use orchestrator::Orchestrator;
pub use sink::{LogSink, MemorySink, WriterSink};
pub use state::PollState;

/// Successful end of a run.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// Report generation was disabled; listing apps proved the credentials.
    AuthenticationVerified { apps: String },
    /// The caller did not wait; the service notifies out of band.
    Deferred { operation_id: String },
    /// The deadline passed before the operation referenced a report.
    TimedOut { operation_id: String },
    Evaluated(Evaluation),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Evaluation {
    pub operation_id: String,
    pub report_id: String,
    pub results_uri: Option<String>,
    pub severity_threshold: SeverityThreshold,
    /// True when evaluation was forced by the deadline.
    pub timed_out: bool,
    pub failing_checks: Vec<String>,
}

/// Cancels a running orchestration.
///
/// Only the first cause is kept. Stopping a finished run does nothing.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<Option<String>>>,
}

impl StopHandle {
    pub(crate) fn channel() -> (Self, watch::Receiver<Option<String>>) {
        let (tx, rx) = watch::channel(None);
        (
            Self {
                tx: Arc::new(tx),
            },
            rx,
        )
    }

    pub fn stop(&self, cause: impl Into<String>) {
        let cause = cause.into();
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(cause);
            true
        });
    }
}

/// Resolves once `stop` fires; pends forever if every handle is gone.
pub(crate) async fn stopped(rx: &mut watch::Receiver<Option<String>>) -> String {
    loop {
        let cause = rx.borrow_and_update().clone();
        if let Some(cause) = cause {
            return cause;
        }
        if rx.changed().await.is_err() {
            return std::future::pending().await;
        }
    }
}

enum Completion {
    Ready(Result<Outcome, CheckupError>),
    Running {
        task: JoinHandle<Result<Outcome, CheckupError>>,
        sink: Arc<dyn LogSink>,
    },
}

/// A started orchestration.
pub struct Execution {
    stop: StopHandle,
    completion: Completion,
}

impl Execution {
    pub(crate) fn ready(stop: StopHandle, result: Result<Outcome, CheckupError>) -> Self {
        Self {
            stop,
            completion: Completion::Ready(result),
        }
    }

    /// `sink` receives the failure if the task dies without a result.
    pub(crate) fn running(
        stop: StopHandle,
        task: JoinHandle<Result<Outcome, CheckupError>>,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            stop,
            completion: Completion::Running { task, sink },
        }
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self, cause: impl Into<String>) {
        self.stop.stop(cause);
    }

    /// True while the poll task is still running.
    pub fn is_polling(&self) -> bool {
        match &self.completion {
            Completion::Ready(_) => false,
            Completion::Running { task, .. } => !task.is_finished(),
        }
    }

    pub async fn wait(self) -> Result<Outcome, CheckupError> {
        let Execution { stop, completion } = self;
        let result = match completion {
            Completion::Ready(result) => result,
            Completion::Running { task, sink } => match task.await {
                Ok(result) => result,
                Err(err) => {
                    let err = CheckupError::Task(err.to_string());
                    warn!(error = %err, "poll task aborted");
                    sink.error(&err);
                    Err(err)
                }
            },
        };
        drop(stop);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_stop_cause_wins() {
        let (handle, mut rx) = StopHandle::channel();
        handle.stop("first");
        handle.stop("second");
        assert_eq!(stopped(&mut rx).await, "first");
    }

    #[tokio::test]
    async fn stop_wakes_a_waiting_receiver() {
        let (handle, mut rx) = StopHandle::channel();
        let waiter = tokio::spawn(async move { stopped(&mut rx).await });
        tokio::task::yield_now().await;
        handle.clone().stop("cancelled");
        assert_eq!(waiter.await.unwrap(), "cancelled");
    }

    #[tokio::test]
    async fn ready_execution_returns_its_result() {
        let (handle, _rx) = StopHandle::channel();
        let execution = Execution::ready(
            handle,
            Ok(Outcome::Deferred {
                operation_id: "1".into(),
            }),
        );
        assert!(!execution.is_polling());
        assert!(matches!(
            execution.wait().await,
            Ok(Outcome::Deferred { .. })
        ));
    }

    #[tokio::test]
    async fn panicking_poll_task_is_reported_to_the_log() {
        let (handle, _rx) = StopHandle::channel();
        let sink = Arc::new(MemorySink::new());
        let task: JoinHandle<Result<Outcome, CheckupError>> =
            tokio::spawn(async { panic!("poll task blew up") });
        let execution = Execution::running(handle, task, sink.clone());

        let err = execution.wait().await.unwrap_err();

        assert!(matches!(err, CheckupError::Task(_)));
        assert_eq!(err.exit_code(), 2);
        assert!(sink.contains("ERROR: poll task ended abnormally"));
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let json = serde_json::to_value(Outcome::TimedOut {
            operation_id: "9".into(),
        })
        .unwrap();
        assert_eq!(json["status"], "timed_out");
        assert_eq!(json["operation_id"], "9");
    }
}
