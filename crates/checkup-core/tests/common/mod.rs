#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use checkup_core::api::{ApiEndpoint, ChecksApi, Connector};
use checkup_core::artifact::read::read_artifact;
use checkup_core::auth::{AccessToken, SecretSource, SecretStoreProvider};
use checkup_core::report::model::{Operation, Report, ReportReference, UploadResult};
use checkup_core::workflow::{MemorySink, Orchestrator, PollSettings, StepConfig};
use checkup_core::{ApiError, CheckupError};
use tempfile::TempDir;

pub const OPERATION_NAME: &str = "accounts/1/apps/12/operations/123";
pub const REPORT_NAME: &str = "accounts/1/apps/12/reports/456";
pub const CREDENTIAL_ID: &str = "checks-service-account-content";

/// Scripted Checks API shared between a test and the orchestrator.
#[derive(Default)]
pub struct FakeState {
    /// Answers to `check_operation`, in order; the last one repeats.
    pub operations: Mutex<Vec<Result<Operation, ApiError>>>,
    pub report: Mutex<Option<Result<Report, ApiError>>>,
    pub apps: Mutex<String>,
    pub calls: Mutex<Vec<String>>,
    pub tokens: Mutex<Vec<String>>,
}

impl FakeState {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[derive(Clone)]
pub struct FakeApi(pub Arc<FakeState>);

#[async_trait]
impl ChecksApi for FakeApi {
    async fn list_apps(&self) -> Result<String, CheckupError> {
        self.0.record("list_apps".into());
        Ok(self.0.apps.lock().unwrap().clone())
    }

    async fn upload_binary(&self, path: &Path) -> Result<UploadResult, CheckupError> {
        self.0.record(format!("upload {}", path.display()));
        read_artifact(path).await?;
        Ok(UploadResult {
            name: OPERATION_NAME.into(),
        })
    }

    async fn check_operation(&self, operation_id: &str) -> Result<Operation, CheckupError> {
        self.0.record(format!("check_operation {operation_id}"));
        let mut operations = self.0.operations.lock().unwrap();
        let next = if operations.len() > 1 {
            operations.remove(0)
        } else {
            operations
                .first()
                .cloned()
                .unwrap_or_else(|| Ok(pending()))
        };
        Ok(next?)
    }

    async fn get_report(&self, report_id: &str) -> Result<Report, CheckupError> {
        self.0.record(format!("get_report {report_id}"));
        let report = self.0.report.lock().unwrap().clone();
        Ok(report.unwrap_or_else(|| Ok(Report::default()))?)
    }
}

pub struct FakeConnector(pub Arc<FakeState>);

impl Connector for FakeConnector {
    type Api = FakeApi;

    fn connect(&self, _endpoint: ApiEndpoint, token: &AccessToken) -> FakeApi {
        self.0.tokens.lock().unwrap().push(token.value.clone());
        FakeApi(Arc::clone(&self.0))
    }
}

pub fn pending() -> Operation {
    Operation {
        name: OPERATION_NAME.into(),
        done: false,
        response: None,
    }
}

pub fn done() -> Operation {
    Operation {
        name: OPERATION_NAME.into(),
        done: true,
        response: Some(ReportReference {
            name: REPORT_NAME.into(),
            results_uri: Some("https://checks.example/console/dashboard/456?a=12".into()),
        }),
    }
}

pub fn report(json: &str) -> Report {
    serde_json::from_str(json).expect("valid report fixture")
}

/// Temp dir holding an artifact and a secrets store with one token.
pub struct Workspace {
    pub dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("app.apk"), b"PK\x03\x04fake-apk").unwrap();
        std::fs::create_dir(dir.path().join("secrets")).unwrap();
        std::fs::write(dir.path().join("secrets").join(CREDENTIAL_ID), "test-token\n").unwrap();
        Self { dir }
    }

    pub fn artifact(&self) -> PathBuf {
        self.dir.path().join("app.apk")
    }

    pub fn state_file(&self) -> PathBuf {
        self.dir.path().join("state.json")
    }

    pub fn config(&self) -> StepConfig {
        let mut config = StepConfig::new("checks-upload", "1", "12", self.artifact());
        config.credential_id = Some(CREDENTIAL_ID.into());
        config
    }

    pub fn credentials(&self) -> Arc<SecretStoreProvider> {
        Arc::new(SecretStoreProvider::new(SecretSource::Directory(
            self.dir.path().join("secrets"),
        )))
    }
}

pub fn fast_polling() -> PollSettings {
    PollSettings {
        interval: Duration::from_millis(5),
        timeout: Duration::from_secs(60),
    }
}

/// Orchestrator wired to a fake API and an in-memory log.
pub fn orchestrator(
    ws: &Workspace,
    config: StepConfig,
    api: &Arc<FakeState>,
    sink: &Arc<MemorySink>,
) -> Orchestrator<FakeConnector> {
    Orchestrator::new(
        config,
        ws.credentials(),
        FakeConnector(Arc::clone(api)),
        sink.clone(),
    )
    .with_settings(fast_polling())
}

impl Workspace {
    pub fn upload_call(&self) -> String {
        format!("upload {}", self.artifact().display())
    }
}
