use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::api::{ApiEndpoint, ChecksApi, Connector};
use crate::artifact::read::read_artifact;
use crate::auth::provider::AccessToken;
use crate::error::{ApiError, CheckupError};
use crate::report::model::{Operation, Report, UploadResult};

pub const USER_PROJECT_HEADER: &str = "X-Goog-User-Project";
pub const UPLOAD_PROTOCOL_HEADER: &str = "X-Goog-Upload-Protocol";

/// HTTP client for one account/app pair, authenticated with a bearer token.
///
/// Stateless apart from its configuration. Every call is issued once; a
/// non-2xx answer becomes an `ApiError` and is never retried here.
#[derive(Debug, Clone)]
pub struct ChecksClient {
    http: reqwest::Client,
    endpoint: ApiEndpoint,
    token: String,
}

impl ChecksClient {
    pub fn new(http: reqwest::Client, endpoint: ApiEndpoint, token: impl Into<String>) -> Self {
        Self {
            http,
            endpoint,
            token: token.into(),
        }
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        debug!(%method, %url, "checks api request");
        self.http
            .request(method, url)
            .header(USER_PROJECT_HEADER, &self.endpoint.project_id)
            .bearer_auth(&self.token)
    }

    async fn execute(&self, request: RequestBuilder) -> Result<Response, CheckupError> {
        let response = request.send().await?;
        let status = response.status().as_u16();
        debug!(status, "checks api response");
        match ApiError::from_status(status) {
            Some(err) => Err(err.into()),
            None => Ok(response),
        }
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, CheckupError> {
        let body = self.execute(request).await?.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl ChecksApi for ChecksClient {
    async fn list_apps(&self) -> Result<String, CheckupError> {
        let request = self.request(Method::GET, self.endpoint.apps_url());
        Ok(self.execute(request).await?.text().await?)
    }

    async fn upload_binary(&self, path: &Path) -> Result<UploadResult, CheckupError> {
        let artifact = read_artifact(path).await?;
        info!(artifact = %artifact.summary(), "uploading artifact");

        let request = self
            .request(Method::POST, self.endpoint.upload_url())
            .header(UPLOAD_PROTOCOL_HEADER, "raw")
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(artifact.bytes);
        self.execute_json(request).await
    }

    async fn check_operation(&self, operation_id: &str) -> Result<Operation, CheckupError> {
        let request = self.request(Method::GET, self.endpoint.operation_url(operation_id));
        self.execute_json(request).await
    }

    async fn get_report(&self, report_id: &str) -> Result<Report, CheckupError> {
        let request = self.request(Method::GET, self.endpoint.report_url(report_id));
        self.execute_json(request).await
    }
}

/// Per-connect and per-read limits. There is no total deadline, so a large
/// upload may take as long as it needs while bytes keep flowing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Duration,
    pub read: Duration,
}

impl Default for HttpTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(20),
            read: Duration::from_secs(20),
        }
    }
}

/// Connects `ChecksClient`s that share one connection pool.
#[derive(Debug, Clone)]
pub struct HttpConnector {
    http: reqwest::Client,
}

impl HttpConnector {
    pub fn new(timeouts: HttpTimeouts) -> Result<Self, CheckupError> {
        let http = reqwest::Client::builder()
            .connect_timeout(timeouts.connect)
            .read_timeout(timeouts.read)
            .user_agent(concat!("checkup/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { http })
    }
}

impl Connector for HttpConnector {
    type Api = ChecksClient;

    fn connect(&self, endpoint: ApiEndpoint, token: &AccessToken) -> ChecksClient {
        ChecksClient::new(self.http.clone(), endpoint, token.value.clone())
    }
}
