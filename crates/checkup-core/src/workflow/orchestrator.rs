use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::api::{ChecksApi, Connector};
use crate::auth::provider::CredentialProvider;
use crate::error::CheckupError;
use crate::workflow::config::{PollSettings, StepConfig};
use crate::workflow::poller::Poller;
use crate::workflow::sink::LogSink;
use crate::workflow::state::PollState;
use crate::workflow::{Execution, Outcome, StopHandle};

pub const NOT_WAITING: &str =
    "Not waiting for the report to be generated. You'll receive an email once the report is ready.";

pub const REPORT_DISABLED: &str =
    "Generating a report is disabled. Testing authentication by listing apps";

/// Coarse position of an orchestration, used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Authenticating,
    Uploading,
    Polling,
    Evaluating,
    NoReportRequested,
    NoWait,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Authenticating => "AUTHENTICATING",
            Phase::Uploading => "UPLOADING",
            Phase::Polling => "POLLING",
            Phase::Evaluating => "EVALUATING",
            Phase::NoReportRequested => "NO_REPORT_REQUESTED",
            Phase::NoWait => "NO_WAIT",
        };
        f.write_str(name)
    }
}

enum Started<A> {
    Finished(Outcome),
    Polling(Poller<A>),
}

/// Drives one upload request from authentication to a verdict.
///
/// `start` returns once the upload is accepted and polling is scheduled on
/// the Tokio runtime; the verdict arrives through [`Execution::wait`].
pub struct Orchestrator<C> {
    config: StepConfig,
    credentials: Arc<dyn CredentialProvider>,
    connector: C,
    sink: Arc<dyn LogSink>,
    settings: PollSettings,
    state_file: Option<PathBuf>,
}

impl<C: Connector> Orchestrator<C> {
    pub fn new(
        config: StepConfig,
        credentials: Arc<dyn CredentialProvider>,
        connector: C,
        sink: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            config,
            credentials,
            connector,
            sink,
            settings: PollSettings::default(),
            state_file: None,
        }
    }

    pub fn with_settings(mut self, settings: PollSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Persist the poll state here while polling, for [`Orchestrator::resume`].
    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_file = Some(path.into());
        self
    }

    pub async fn start(self) -> Execution {
        let (stop, rx) = StopHandle::channel();
        match self.begin().await {
            Ok(Started::Finished(outcome)) => Execution::ready(stop, Ok(outcome)),
            Ok(Started::Polling(poller)) => {
                info!(phase = %Phase::Polling, operation_id = %poller.state.operation_id);
                let task = tokio::spawn(poller.run(rx));
                Execution::running(stop, task, Arc::clone(&self.sink))
            }
            Err(err) => Execution::ready(stop, Err(self.fail(err))),
        }
    }

    /// Re-enters polling for a previously uploaded artifact.
    ///
    /// The persisted configuration replaces the one given to `new`. The
    /// artifact is not uploaded again and the original deadline is kept.
    pub async fn resume(mut self, state: PollState) -> Execution {
        let (stop, rx) = StopHandle::channel();
        self.config = state.config.clone();
        self.sink
            .line(&format!("Resuming operationId={}", state.operation_id));

        match self.authenticate().await {
            Ok(api) => {
                info!(phase = %Phase::Polling, operation_id = %state.operation_id, "resumed");
                let poller = self.poller(api, state);
                let task = tokio::spawn(poller.run(rx));
                Execution::running(stop, task, Arc::clone(&self.sink))
            }
            Err(err) => Execution::ready(stop, Err(self.fail(err))),
        }
    }

    async fn begin(&self) -> Result<Started<C::Api>, CheckupError> {
        let api = self.authenticate().await?;

        if !self.config.generate_report {
            info!(phase = %Phase::NoReportRequested);
            self.sink.line(REPORT_DISABLED);
            let apps = api.list_apps().await?;
            self.sink.line(&apps);
            return Ok(Started::Finished(Outcome::AuthenticationVerified { apps }));
        }

        info!(phase = %Phase::Uploading, path = %self.config.binary_path.display());
        self.sink
            .line(&format!("Uploading {}", self.config.binary_path.display()));
        let upload = api.upload_binary(&self.config.binary_path).await?;

        let state = PollState::new(
            self.config.clone(),
            upload.operation_id(),
            Utc::now(),
            self.settings.timeout,
        );

        if !self.config.wait_for_report {
            info!(phase = %Phase::NoWait, operation_id = %state.operation_id);
            self.sink.line(NOT_WAITING);
            return Ok(Started::Finished(Outcome::Deferred {
                operation_id: state.operation_id,
            }));
        }

        if let Some(path) = &self.state_file {
            state.save(path).await?;
        }
        Ok(Started::Polling(self.poller(api, state)))
    }

    async fn authenticate(&self) -> Result<C::Api, CheckupError> {
        info!(phase = %Phase::Authenticating);
        let token = self
            .credentials
            .authenticate(self.config.credential_id.as_deref())
            .await?;
        Ok(self.connector.connect(self.config.endpoint(), &token))
    }

    fn poller(&self, api: C::Api, state: PollState) -> Poller<C::Api> {
        Poller {
            api,
            sink: Arc::clone(&self.sink),
            interval: self.settings.interval,
            state,
            state_file: self.state_file.clone(),
        }
    }

    fn fail(&self, err: CheckupError) -> CheckupError {
        warn!(error = %err, "orchestration failed");
        self.sink.error(&err);
        err
    }
}
