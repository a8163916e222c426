use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://checks.googleapis.com";

/// Where requests go and on whose behalf.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ApiEndpoint {
    pub base_url: String,
    pub project_id: String,
    pub account_id: String,
    pub app_id: String,
}

impl ApiEndpoint {
    fn root(&self) -> &str {
        self.base_url.trim_end_matches('/')
    }

    pub fn apps_url(&self) -> String {
        format!("{}/v1alpha/accounts/{}/apps/", self.root(), self.account_id)
    }

    pub fn upload_url(&self) -> String {
        format!(
            "{}/upload/v1alpha/accounts/{}/apps/{}/reports:analyzeUpload",
            self.root(),
            self.account_id,
            self.app_id
        )
    }

    pub fn operation_url(&self, operation_id: &str) -> String {
        format!(
            "{}/v1alpha/accounts/{}/apps/{}/operations/{}",
            self.root(),
            self.account_id,
            self.app_id,
            operation_id
        )
    }

    pub fn report_url(&self, report_id: &str) -> String {
        format!(
            "{}/v1alpha/accounts/{}/apps/{}/reports/{}?fields=name,checks(type,state,severity)",
            self.root(),
            self.account_id,
            self.app_id,
            report_id
        )
    }
}
