//! Checks API surface.
//!
//! `ChecksApi` is the seam the workflow talks to; `ChecksClient` is the
//! HTTP implementation and `Connector` turns a bearer token into one.

use std::path::Path;

use async_trait::async_trait;

use crate::auth::provider::AccessToken;
use crate::error::CheckupError;
use crate::report::model::{Operation, Report, UploadResult};

pub mod client;
pub mod endpoint;

pub use client::{ChecksClient, HttpConnector, HttpTimeouts};
pub use endpoint::ApiEndpoint;

#[async_trait]
pub trait ChecksApi: Send + Sync {
    /// Raw app listing. Only used to smoke-test authentication.
    async fn list_apps(&self) -> Result<String, CheckupError>;

    async fn upload_binary(&self, path: &Path) -> Result<UploadResult, CheckupError>;

    async fn check_operation(&self, operation_id: &str) -> Result<Operation, CheckupError>;

    async fn get_report(&self, report_id: &str) -> Result<Report, CheckupError>;
}

/// Builds an authenticated API handle for one orchestration.
pub trait Connector: Send + Sync {
    type Api: ChecksApi + 'static;

    fn connect(&self, endpoint: ApiEndpoint, token: &AccessToken) -> Self::Api;
}
